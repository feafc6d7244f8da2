//! Single-producer/single-consumer "latest value" cells.
//!
//! Pointer, resize and parameter events may arrive zero or more times between
//! frames, possibly from another thread. The producer overwrites; the frame
//! loop takes exactly one snapshot at frame start and keeps using that copy.
//! If nothing was written since the last frame the previous value is returned.

use triple_buffer::{triple_buffer, Input, Output};

/// Producer half. Each write replaces whatever the reader has not seen yet.
pub struct CellWriter<T: Clone + Send> {
    input: Input<T>,
    last: T,
}

/// Consumer half, owned by the frame loop.
pub struct CellReader<T: Clone + Send> {
    output: Output<T>,
}

pub fn latest_cell<T: Clone + Send>(initial: T) -> (CellWriter<T>, CellReader<T>) {
    let (input, output) = triple_buffer(&initial);
    (
        CellWriter {
            input,
            last: initial,
        },
        CellReader { output },
    )
}

impl<T: Clone + Send> CellWriter<T> {
    pub fn write(&mut self, value: T) {
        self.last = value.clone();
        self.input.write(value);
    }

    /// Read-modify-write against the producer's own latest value.
    pub fn update(&mut self, f: impl FnOnce(&mut T)) {
        let mut next = self.last.clone();
        f(&mut next);
        self.write(next);
    }

    pub fn latest(&self) -> &T {
        &self.last
    }
}

impl<T: Clone + Send> CellReader<T> {
    /// Latest published value; stale-but-consistent if nothing new arrived.
    pub fn snapshot(&mut self) -> T {
        self.output.read().clone()
    }

    /// Whether a write landed since the previous snapshot.
    pub fn has_update(&self) -> bool {
        self.output.updated()
    }
}
