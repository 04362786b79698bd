/// Maximum luminous efficacy of photopic vision in lm/W.
pub const K_M: f64 = 683.0;

/// CIE 1924 photopic luminous efficiency V(λ), tabulated on
/// [`crate::common::MITSUBA_SHAPE`], 360 nm to 830 nm in 5 nm steps.
#[rustfmt::skip]
pub const PHOTOPIC_V: [f64; 95] = [
    // 360 - 405
    0.000003917, 0.000006965, 0.00001239, 0.00002202, 0.000039,
    0.000064, 0.00012, 0.000217, 0.000396, 0.00064,
    // 410 - 455
    0.00121, 0.00218, 0.004, 0.0073, 0.0116,
    0.01684, 0.023, 0.0298, 0.038, 0.048,
    // 460 - 505
    0.06, 0.0739, 0.09098, 0.1126, 0.13902,
    0.1693, 0.20802, 0.2586, 0.323, 0.4073,
    // 510 - 555
    0.503, 0.6082, 0.71, 0.7932, 0.862,
    0.91485, 0.954, 0.9803, 0.99495, 1.0,
    // 560 - 605
    0.995, 0.9786, 0.952, 0.9154, 0.87,
    0.8163, 0.757, 0.6949, 0.631, 0.5668,
    // 610 - 655
    0.503, 0.4412, 0.381, 0.321, 0.265,
    0.217, 0.175, 0.1382, 0.107, 0.0816,
    // 660 - 705
    0.061, 0.04458, 0.032, 0.0232, 0.017,
    0.01192, 0.00821, 0.005723, 0.004102, 0.002929,
    // 710 - 755
    0.002091, 0.001484, 0.001047, 0.00074, 0.00052,
    0.0003611, 0.0002492, 0.0001719, 0.00012, 0.0000848,
    // 760 - 805
    0.00006, 0.0000424, 0.00003, 0.0000212, 0.00001499,
    0.0000106, 0.0000074657, 0.0000052578, 0.0000037029, 0.0000026078,
    // 810 - 830
    0.0000018366, 0.0000012934, 0.00000091093, 0.00000064153, 0.00000045181,
];
