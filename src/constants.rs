//! Physical constants and fixed filter designs.
//!
//! The FIR coefficient tables below are the same band-pass and decimating
//! low-pass designs carried in the vendor reference: `fir1(64, [0.10 0.35
//! 0.99], 'DC-1')` for the 65-tap macro band-pass, and `fir1(128, 5/100)`
//! for the 129-tap decimator. Slow-time axis is normalized to 100 Hz.

pub const SPEED_OF_LIGHT_MPS: f32 = 299_792_458.0;
pub const RADAR_CARRIER_FREQ_HZ: f32 = 60.0e9;
pub const ANT_SPACING_M: f32 = 0.0025;

pub const NUM_SAMPLES_PER_CHIRP_DEFAULT: usize = 128;
pub const NUM_CHIRPS_PER_FRAME: usize = 16;
pub const NUM_RX_ANTENNAS: usize = 3;

pub const MAX_RANGE_LIMIT_M: f32 = 5.0;
pub const AOA_MIN_RANGE_M: f32 = 0.30;
pub const AOA_MAX_RANGE_M: f32 = 5.0;
pub const AOA_MIN_POWER_DB: f32 = -30.0;

pub const BANDPASS_NUMTAPS: usize = 65;
pub const BANDPASS_DELAY_MS: u64 = 490;

pub const DECIMATION_NUMTAPS: usize = 129;
pub const DECIMATION_FACTOR: usize = 8;

/// 65-tap band-pass FIR used by the macro pre-filter, one instance per range
/// bin. Symmetric; DC-constrained design covering roughly 10-35 Hz of a
/// 100 Hz slow-time axis.
pub const BANDPASS_COEFFS: [f32; BANDPASS_NUMTAPS] = [
    -0.000672018944688787,
    5.40997750800323e-05,
    -0.00170551007050673,
    0.000706931294401583,
    0.000529718080087782,
    0.00403359866465874,
    0.00102443397277923,
    0.00234848093688213,
    -0.00194992073010673,
    0.00451365295988384,
    0.00312574092180467,
    0.00888191214923986,
    -0.00340548841703134,
    -0.00434494380465395,
    -0.0153910491204704,
    -0.00133041100723547,
    -0.00517641595111685,
    0.00200054539528286,
    -0.0241426155178683,
    -0.0230852875573157,
    -0.0293254372480552,
    0.0105956968865953,
    0.0175013648649183,
    0.0306608940135099,
    -0.00856346834860387,
    0.00160778144085906,
    0.0222545709144638,
    0.112213549580022,
    0.136465963717548,
    0.110216333677660,
    -0.0448122804532963,
    -0.174898778170997,
    0.740136712192538,
    -0.174898778170997,
    -0.0448122804532963,
    0.110216333677660,
    0.136465963717548,
    0.112213549580022,
    0.0222545709144638,
    0.00160778144085906,
    -0.00856346834860387,
    0.0306608940135099,
    0.0175013648649183,
    0.0105956968865953,
    -0.0293254372480552,
    -0.0230852875573157,
    -0.0241426155178683,
    0.00200054539528286,
    -0.00517641595111685,
    -0.00133041100723547,
    -0.0153910491204704,
    -0.00434494380465395,
    -0.00340548841703134,
    0.00888191214923986,
    0.00312574092180467,
    0.00451365295988384,
    -0.00194992073010673,
    0.00234848093688213,
    0.00102443397277923,
    0.00403359866465874,
    0.000529718080087782,
    0.000706931294401583,
    -0.00170551007050673,
    5.40997750800323e-05,
    -0.000672018944688787,
];

/// 129-tap decimating low-pass FIR, factor 8. A 5 Hz cutoff on a 100 Hz
/// slow-time axis feeding the micro track's history ring.
pub const DECIMATION_COEFFS: [f32; DECIMATION_NUMTAPS] = [
    -0.0002335706,
    -0.0001845369,
    -0.0001302661,
    -0.0000692792,
    0.0000000000,
    0.0000790508,
    0.0001690467,
    0.0002706434,
    0.0003837746,
    0.0005074704,
    0.0006397080,
    0.0007773074,
    0.0009158812,
    0.0010498472,
    0.0011725089,
    0.0012762062,
    0.0013525367,
    0.0013926445,
    0.0013875686,
    0.0013286427,
    0.0012079324,
    0.0010186962,
    0.0007558520,
    0.0004164310,
    0.0000000000,
    -0.0004909674,
    -0.0010507895,
    -0.0016703624,
    -0.0023370475,
    -0.0030346730,
    -0.0037436590,
    -0.0044412689,
    -0.0051019897,
    -0.0056980354,
    -0.0061999662,
    -0.0065774088,
    -0.0067998622,
    -0.0068375662,
    -0.0066624096,
    -0.0062488501,
    -0.0055748192,
    -0.0046225811,
    -0.0033795172,
    -0.0018388104,
    0.0000000000,
    0.0021306116,
    0.0045397210,
    0.0072069682,
    0.0101050712,
    0.0132001547,
    0.0164522689,
    0.0198160911,
    0.0232417935,
    0.0266760581,
    0.0300632143,
    0.0333464689,
    0.0364691958,
    0.0393762517,
    0.0420152803,
    0.0443379694,
    0.0463012239,
    0.0478682239,
    0.0490093339,
    0.0497028404,
    0.0499354938,
    0.0497028404,
    0.0490093339,
    0.0478682239,
    0.0463012239,
    0.0443379694,
    0.0420152803,
    0.0393762517,
    0.0364691958,
    0.0333464689,
    0.0300632143,
    0.0266760581,
    0.0232417935,
    0.0198160911,
    0.0164522689,
    0.0132001547,
    0.0101050712,
    0.0072069682,
    0.0045397210,
    0.0021306116,
    0.0000000000,
    -0.0018388104,
    -0.0033795172,
    -0.0046225811,
    -0.0055748192,
    -0.0062488501,
    -0.0066624096,
    -0.0068375662,
    -0.0067998622,
    -0.0065774088,
    -0.0061999662,
    -0.0056980354,
    -0.0051019897,
    -0.0044412689,
    -0.0037436590,
    -0.0030346730,
    -0.0023370475,
    -0.0016703624,
    -0.0010507895,
    -0.0004909674,
    0.0000000000,
    0.0004164310,
    0.0007558520,
    0.0010186962,
    0.0012079324,
    0.0013286427,
    0.0013875686,
    0.0013926445,
    0.0013525367,
    0.0012762062,
    0.0011725089,
    0.0010498472,
    0.0009158812,
    0.0007773074,
    0.0006397080,
    0.0005074704,
    0.0003837746,
    0.0002706434,
    0.0001690467,
    0.0000790508,
    0.0000000000,
    -0.0000692792,
    -0.0001302661,
    -0.0001845369,
    -0.0002335706,
];
