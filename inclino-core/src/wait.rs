//! Wait strategies for the blocking serial calls
//!
//! `write` and `read_byte` block until the interrupt side makes progress.
//! How the foreground passes that time is a property of the platform, not
//! of the channel: bare metal can sleep until the next interrupt, a host
//! test can yield its thread, and the simplest option just spins.

/// How a blocking call waits for the other context
pub trait Wait {
    /// Return once `ready` reports `true`
    ///
    /// Implementations must re-check `ready` after every wakeup. They may
    /// not return early; there is no timeout.
    fn wait_until<F: FnMut() -> bool>(&mut self, ready: F);
}

/// Busy-wait with a spin-loop hint
#[derive(Debug, Clone, Copy, Default)]
pub struct Spin;

impl Wait for Spin {
    fn wait_until<F: FnMut() -> bool>(&mut self, mut ready: F) {
        while !ready() {
            core::hint::spin_loop();
        }
    }
}

impl<W: Wait> Wait for &mut W {
    fn wait_until<F: FnMut() -> bool>(&mut self, ready: F) {
        (**self).wait_until(ready)
    }
}
