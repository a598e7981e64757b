//! Processive agents: RNA polymerases and ribosomes.

use crate::signal::Signal;

/// A polymerase bound to (or about to bind) a polymer.
///
/// Occupies the inclusive footprint `[start, stop]` with
/// `stop - start + 1 == footprint`; the footprint is constant for the
/// lifetime of the bound polymerase. `speed` is the base translocation rate
/// scaled by the polymer's position weights. The move signal fires exactly
/// once per single-nucleotide advance and once per trailing step emitted
/// during termination.
#[derive(Debug)]
pub struct Polymerase {
    name: String,
    start: i64,
    stop: i64,
    footprint: i64,
    speed: f64,
    reading_frame: Option<u8>,
    pub move_signal: Signal<()>,
}

impl Polymerase {
    /// Create an unbound polymerase. Coordinates are assigned at binding.
    pub fn new(name: &str, footprint: i64, speed: f64) -> Self {
        debug_assert!(footprint > 0, "polymerase footprint must be positive");
        debug_assert!(speed > 0.0, "polymerase speed must be positive");
        Self {
            name: name.to_string(),
            start: 0,
            stop: footprint - 1,
            footprint,
            speed,
            reading_frame: None,
            move_signal: Signal::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn stop(&self) -> i64 {
        self.stop
    }

    pub fn footprint(&self) -> i64 {
        self.footprint
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Reading frame on a transcript (`start mod 3`); `None` on DNA.
    pub fn reading_frame(&self) -> Option<u8> {
        self.reading_frame
    }

    pub fn set_reading_frame(&mut self, frame: Option<u8>) {
        self.reading_frame = frame;
    }

    /// Place the polymerase so its footprint begins at `start`.
    pub fn place_at(&mut self, start: i64) {
        self.start = start;
        self.stop = start + self.footprint - 1;
    }

    /// Advance one nucleotide and notify subscribers.
    pub fn advance(&mut self) {
        self.start += 1;
        self.stop += 1;
        self.move_signal.emit(&());
    }

    /// Revert a single advance. Does not emit.
    pub fn retreat(&mut self) {
        debug_assert!(self.start > 0, "retreating past the polymer origin");
        self.start -= 1;
        self.stop -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_footprint_constant_across_moves() {
        let mut pol = Polymerase::new("rnapol", 10, 40.0);
        pol.place_at(5);
        assert_eq!((pol.start(), pol.stop()), (5, 14));

        pol.advance();
        assert_eq!((pol.start(), pol.stop()), (6, 15));
        assert_eq!(pol.stop() - pol.start() + 1, pol.footprint());

        pol.retreat();
        assert_eq!((pol.start(), pol.stop()), (5, 14));
    }

    #[test]
    fn test_move_signal_fires_once_per_advance() {
        let mut pol = Polymerase::new("rnapol", 10, 40.0);
        pol.place_at(1);

        let ticks = Rc::new(RefCell::new(0));
        let counter = ticks.clone();
        pol.move_signal.connect(move |_| *counter.borrow_mut() += 1);

        pol.advance();
        pol.advance();
        pol.retreat();
        assert_eq!(*ticks.borrow(), 2);
    }
}
