use crate::{
    config::RendererConfig,
    error::Result,
    io::StereoOutput,
    midi::stream::MidiStream,
    render::{inputs::BlockInputs, processor::BlockProcessor, queue::EventReceiver},
    synth::{backend::SynthBackend, poly::SubtractiveSynth},
};

enum Lifecycle<B: SynthBackend> {
    Uninitialized,
    Ready(Box<BlockProcessor<B>>),
}

/// Host-facing renderer.
///
/// Hosts may call [`execute`](Self::execute) before the renderer has been
/// prepared; those calls do nothing and leave the output untouched.
/// [`prepare`](Self::prepare) builds the backend and processor exactly once.
pub struct RenderNode<B: SynthBackend + Default = SubtractiveSynth> {
    config: RendererConfig,
    lifecycle: Lifecycle<B>,
    queue: Option<Box<dyn EventReceiver>>,
}

impl<B: SynthBackend + Default> Default for RenderNode<B> {
    fn default() -> Self {
        Self::new(RendererConfig::default())
    }
}

impl<B: SynthBackend + Default> RenderNode<B> {
    /// `config` supplies everything except sample rate, block size, track and
    /// channel, which come from [`prepare`](Self::prepare).
    pub fn new(config: RendererConfig) -> Self {
        Self {
            config,
            lifecycle: Lifecycle::Uninitialized,
            queue: None,
        }
    }

    pub fn prepare(&mut self, sample_rate: f32, block_frames: usize, inputs: &BlockInputs) -> Result<()> {
        if self.is_prepared() {
            log::debug!("renderer already prepared, ignoring");
            return Ok(());
        }

        if let Some(path) = &inputs.library_path {
            log::info!("library path {} noted, not loaded", path.display());
        }
        if let Some(path) = &inputs.tuning_path {
            log::info!("tuning path {} noted, not loaded", path.display());
        }

        let mut config = self
            .config
            .clone()
            .with_sample_rate(sample_rate)
            .with_block_frames(block_frames)
            .with_track(inputs.track);
        config.channel = inputs.channel;

        let mut processor = BlockProcessor::prepare(config, B::default())?;
        if let Some(queue) = self.queue.take() {
            processor.attach_boxed_queue(queue);
        }
        self.lifecycle = Lifecycle::Ready(Box::new(processor));
        Ok(())
    }

    pub fn execute<S>(&mut self, inputs: &BlockInputs, stream: &S, output: &mut StereoOutput)
    where
        S: MidiStream + ?Sized,
    {
        match &mut self.lifecycle {
            Lifecycle::Uninitialized => {}
            Lifecycle::Ready(processor) => processor.execute(inputs, stream, output),
        }
    }

    /// Attach a live event source. May be called before or after prepare.
    pub fn attach_event_queue(&mut self, queue: impl EventReceiver + 'static) {
        match &mut self.lifecycle {
            Lifecycle::Uninitialized => self.queue = Some(Box::new(queue)),
            Lifecycle::Ready(processor) => processor.attach_event_queue(queue),
        }
    }

    /// Create a queue sized from the config and attach its receiving end.
    #[cfg(feature = "rtrb")]
    pub fn event_sender(&mut self) -> crate::render::queue::EventSender {
        let (sender, queue) = crate::render::queue::event_queue(self.config.event_queue_capacity);
        self.attach_event_queue(queue);
        sender
    }

    pub fn is_prepared(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Ready(_))
    }

    pub fn processor(&self) -> Option<&BlockProcessor<B>> {
        match &self.lifecycle {
            Lifecycle::Uninitialized => None,
            Lifecycle::Ready(processor) => Some(processor.as_ref()),
        }
    }

    pub fn processor_mut(&mut self) -> Option<&mut BlockProcessor<B>> {
        match &mut self.lifecycle {
            Lifecycle::Uninitialized => None,
            Lifecycle::Ready(processor) => Some(processor.as_mut()),
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }
}
