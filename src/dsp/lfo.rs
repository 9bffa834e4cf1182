//! Low Frequency Oscillator used by the modulation effects.

/*
Low Frequency Oscillators
=========================

An LFO is an oscillator running at sub-audio frequencies. It makes no sound
of its own; it moves a parameter of something that does.

Vocabulary
----------

  control-rate    Frequencies below human hearing: ~0.01 Hz to ~20 Hz.

  bipolar         Output swings positive AND negative: -1.0 to +1.0.
                  Chorus and flanger push their delay time both ways
                  around a centre.

  unipolar        Output is only positive: 0.0 to 1.0.
                  The phaser sweeps its allpass frequency up from a floor.

                      unipolar = (bipolar + 1.0) * 0.5


Where It Is Used
----------------

    effect       rate            shape      swings
    chorus       mod rate        sine       20 ms +- depth * 10 ms
    flanger      mod rate        sine       2 ms +- depth * 5 ms
    phaser       mod rate        sine       200 Hz .. 200 + depth * 1400 Hz
    tape delay   0.3 Hz (wow)    sine       +-0.2 % of the delay time

The phase is free-running: it is not reset on notes, only by reset().
*/

use std::f32::consts::TAU;

/// Free-running sine LFO.
#[derive(Debug, Clone, Default)]
pub struct Lfo {
    phase: f32,
}

impl Lfo {
    pub fn new() -> Self {
        Self { phase: 0.0 }
    }

    /// Advance by one sample at `rate_hz` and return the bipolar sine value.
    #[inline]
    pub fn next(&mut self, rate_hz: f32, sample_rate: f32) -> f32 {
        self.phase += rate_hz / sample_rate;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        (self.phase * TAU).sin()
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

/// Convert bipolar signal (-1.0 to +1.0) to unipolar (0.0 to 1.0).
#[inline]
pub fn bipolar_to_unipolar(bipolar: f32) -> f32 {
    (bipolar + 1.0) * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bipolar_to_unipolar() {
        assert!((bipolar_to_unipolar(-1.0) - 0.0).abs() < 1e-6);
        assert!((bipolar_to_unipolar(0.0) - 0.5).abs() < 1e-6);
        assert!((bipolar_to_unipolar(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn lfo_completes_one_cycle_per_period() {
        let sample_rate = 1_000.0;
        let mut lfo = Lfo::new();
        let period = (sample_rate / 4.0) as usize;

        let mut peak = 0.0f32;
        for _ in 0..period {
            let value = lfo.next(4.0, sample_rate);
            assert!((-1.0..=1.0).contains(&value));
            peak = peak.max(value);
        }
        assert!(peak > 0.99);
        assert!(lfo.phase() < 1e-3 || lfo.phase() > 1.0 - 1e-3);
    }

    #[test]
    fn reset_rewinds_phase() {
        let mut lfo = Lfo::new();
        for _ in 0..37 {
            lfo.next(3.0, 100.0);
        }
        lfo.reset();
        lfo.reset();
        assert_eq!(lfo.phase(), 0.0);
    }
}
