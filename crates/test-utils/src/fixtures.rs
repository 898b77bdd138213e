//! Common test fixtures for composite frame tests.

/// World files used across the test suite.
pub mod world {
    /// The archive `n0q` composite world file (0.005 deg, upper-left -126, 50).
    pub const N0Q: &str = "0.005\n0.0\n0.0\n-0.005\n-126.0\n50.0\n";

    /// Shape `(rows, cols)` of a full-resolution `n0q` composite.
    pub const N0Q_SHAPE: (usize, usize) = (5400, 12200);

    /// A small synthetic footprint: 0.05 deg pixels from (-100, 45).
    ///
    /// With [`SMALL_SHAPE`] it spans latitude 45 to 44 and longitude -100 to -98.
    pub const SMALL: &str = "0.05\n0.0\n0.0\n-0.05\n-100.0\n45.0\n";

    /// Raster shape `(rows, cols)` paired with [`SMALL`].
    pub const SMALL_SHAPE: (usize, usize) = (20, 40);

    /// Only five terms.
    pub const TRUNCATED: &str = "0.05\n0.0\n0.0\n-0.05\n-100.0\n";
}

/// Archive timestamps and filenames.
pub mod time {
    /// The archive frame used by end-to-end tests.
    pub const NEW_YEAR_2018: &str = "2018-01-01T00:00:00";

    /// Its local filename on platforms that allow `:`.
    pub const NEW_YEAR_2018_FRAME: &str = "nexrad2018-01-01T00:00:00.png";

    /// Its local filename on platforms that do not.
    pub const NEW_YEAR_2018_FRAME_DASHES: &str = "nexrad2018-01-01T00-00-00.png";
}

/// A few colours from the reflectivity ramp, none of them black.
pub mod palette {
    pub const REFLECTIVITY: [[u8; 3]; 8] = [
        [4, 233, 231],   // 5 dBZ
        [1, 159, 244],   // 10 dBZ
        [3, 0, 244],     // 15 dBZ
        [2, 253, 2],     // 20 dBZ
        [1, 197, 1],     // 25 dBZ
        [253, 248, 2],   // 35 dBZ
        [253, 149, 0],   // 45 dBZ
        [212, 0, 0],     // 55 dBZ
    ];

    /// The "no echo" value in archive composites.
    pub const NO_ECHO: [u8; 3] = [0, 0, 0];
}
