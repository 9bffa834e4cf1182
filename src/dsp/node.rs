/// Lifecycle shared by every module in the signal chain.
///
/// `prepare` is the only call allowed to allocate and must happen before
/// streaming starts. `reset` and `process_sample` are realtime-safe.
pub trait DspModule: Send {
    /// Size buffers and derive coefficients for `sample_rate`.
    fn prepare(&mut self, sample_rate: f32, max_block: usize);

    /// Clear delay lines, phases and filter memory.
    fn reset(&mut self);

    /// Process one sample. Generators ignore `input`.
    fn process_sample(&mut self, input: f32) -> f32;

    /// Process a block in place.
    ///
    /// Default implementation runs `process_sample` over the buffer.
    fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }
}

/// Allow boxed modules to be used as modules (for dynamic dispatch)
impl DspModule for Box<dyn DspModule> {
    fn prepare(&mut self, sample_rate: f32, max_block: usize) {
        (**self).prepare(sample_rate, max_block)
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn process_sample(&mut self, input: f32) -> f32 {
        (**self).process_sample(input)
    }

    fn render(&mut self, buffer: &mut [f32]) {
        (**self).render(buffer)
    }
}
