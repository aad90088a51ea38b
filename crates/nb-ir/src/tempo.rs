//! Tempo representation.
//!
//! `Tempo` stores hundredths of a tick per second, the same fixed-point
//! value the file format carries, so a decoded tempo re-encodes exactly.
//! The editor talks in BPM with four ticks per beat.

/// Ticks per beat assumed by BPM conversions.
pub const TICKS_PER_BEAT: u32 = 4;

/// Largest representable tempo in hundredths of a tick per second.
pub const MAX_CENTI_TPS: u16 = i16::MAX as u16;

/// Playback speed in ticks per second, stored as hundredths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tempo {
    centi_tps: u16,
}

impl Tempo {
    /// Default tempo for unset songs: 5 ticks per second.
    pub const DEFAULT: Tempo = Tempo { centi_tps: 500 };

    /// Create from the raw hundredths-of-a-tick value. Clamps to `MAX_CENTI_TPS`.
    pub const fn from_centi_ticks_per_second(centi_tps: u16) -> Self {
        let centi_tps = if centi_tps > MAX_CENTI_TPS { MAX_CENTI_TPS } else { centi_tps };
        Self { centi_tps }
    }

    /// Create from ticks per second, rounded to the nearest hundredth.
    pub fn from_ticks_per_second(tps: f64) -> Self {
        let centi = libm::round(tps * 100.0);
        let centi = if centi.is_nan() { 0.0 } else { centi.clamp(0.0, MAX_CENTI_TPS as f64) };
        Self { centi_tps: centi as u16 }
    }

    /// Create from beats per minute: `tps = bpm * 4 / 60`.
    pub fn from_bpm(bpm: f64) -> Self {
        Self::from_ticks_per_second(bpm * TICKS_PER_BEAT as f64 / 60.0)
    }

    /// Raw hundredths of a tick per second.
    pub const fn centi_ticks_per_second(self) -> u16 {
        self.centi_tps
    }

    pub fn ticks_per_second(self) -> f64 {
        self.centi_tps as f64 / 100.0
    }

    /// Beats per minute: `bpm = tps * 60 / 4`.
    pub fn bpm(self) -> f64 {
        self.ticks_per_second() * 60.0 / TICKS_PER_BEAT as f64
    }

    /// Duration of `ticks` ticks in seconds. Zero tempo yields zero.
    pub fn seconds_for_ticks(self, ticks: u32) -> f64 {
        if self.centi_tps == 0 {
            return 0.0;
        }
        ticks as f64 / self.ticks_per_second()
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_five_ticks_per_second() {
        assert_eq!(Tempo::default().ticks_per_second(), 5.0);
        assert_eq!(Tempo::default().centi_ticks_per_second(), 500);
    }

    #[test]
    fn bpm_factor_is_sixty_over_four() {
        let tempo = Tempo::from_bpm(120.0);
        assert_eq!(tempo.ticks_per_second(), 8.0);
        assert_eq!(tempo.bpm(), 120.0);

        let tempo = Tempo::from_ticks_per_second(10.0);
        assert_eq!(tempo.bpm(), 150.0);
    }

    #[test]
    fn rounds_to_hundredths() {
        assert_eq!(Tempo::from_ticks_per_second(6.666).centi_ticks_per_second(), 667);
        assert_eq!(Tempo::from_bpm(100.0).centi_ticks_per_second(), 667);
    }

    #[test]
    fn clamps_out_of_range() {
        assert_eq!(Tempo::from_ticks_per_second(-3.0).centi_ticks_per_second(), 0);
        assert_eq!(Tempo::from_ticks_per_second(1e9).centi_ticks_per_second(), MAX_CENTI_TPS);
        assert_eq!(Tempo::from_ticks_per_second(f64::NAN).centi_ticks_per_second(), 0);
        assert_eq!(Tempo::from_centi_ticks_per_second(u16::MAX).centi_ticks_per_second(), MAX_CENTI_TPS);
    }

    #[test]
    fn seconds_for_ticks() {
        let tempo = Tempo::from_ticks_per_second(4.0);
        assert_eq!(tempo.seconds_for_ticks(8), 2.0);
        assert_eq!(Tempo::from_centi_ticks_per_second(0).seconds_for_ticks(8), 0.0);
    }
}
