//! Dataset slot controller.
//!
//! Owns both dataset slots and their pipelines, consumes interaction events
//! and issues re-renders for exactly the surfaces an event affects. Events
//! aimed at a slot that is not loaded are dropped, never queued.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info, warn};
use web_time::Instant;

use crate::catalog::Catalog;
use crate::compositor::{Renderer, ViewCompositor};
use crate::config::ViewerConfig;
use crate::enums::{ColorChoice, ColorTarget, Control, Label, Orientation, SlotId, Surface};
use crate::error::{RenderError, ViewerError};
use crate::interaction::InteractionSurface;
use crate::slot::{DatasetSlot, SlotPipelines, SlotState};
use crate::volume_loader::{ANONYMOUS_PATIENT, VolumeSource};

/// An event reported by the interaction surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerEvent {
    /// A load was requested and the directory chooser returned `directory`.
    LoadRequested { slot: SlotId, directory: PathBuf },
    SliceChanged { plane: Orientation, value: i32 },
    /// Opacity slider moved, `value` in percent.
    OpacityChanged { slot: SlotId, value: i32 },
    /// Colour of the slot's 3-D volume.
    ColorChoiceChanged { slot: SlotId, choice: ColorChoice },
    /// Colour of the slot's three cross-sections.
    SliceColorChoiceChanged { slot: SlotId, choice: ColorChoice },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Ignored(Ignored),
}

/// Why an event changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored {
    /// The directory chooser was cancelled.
    Cancelled,
    SlotNotLoaded,
    OutOfRange,
    /// Value change caused by the controller's own slider update.
    ControllerEcho,
}

pub struct SlotController<S, R, U> {
    source: S,
    compositor: ViewCompositor<R>,
    ui: U,
    catalog: Catalog,
    config: ViewerConfig,
    slots: [DatasetSlot; 2],
    slider_max: [i32; 3],
    pending_echoes: HashMap<Control, i32>,
}

impl<S, R, U> SlotController<S, R, U>
where
    S: VolumeSource,
    R: Renderer,
    U: InteractionSurface,
{
    pub fn new(source: S, renderer: R, ui: U, config: ViewerConfig) -> Self {
        Self {
            source,
            compositor: ViewCompositor::new(renderer),
            ui,
            catalog: Catalog::standard(),
            config,
            slots: SlotId::ALL.map(DatasetSlot::new),
            slider_max: [0; 3],
            pending_echoes: HashMap::new(),
        }
    }

    pub fn slot(&self, slot: SlotId) -> &DatasetSlot {
        &self.slots[slot.index()]
    }

    pub fn compositor(&self) -> &ViewCompositor<R> {
        &self.compositor
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Dispatches one event, dropping slider echoes of the controller's own updates.
    pub fn handle(&mut self, event: ViewerEvent) -> Result<Outcome, ViewerError> {
        match event {
            ViewerEvent::LoadRequested { slot, directory } => self.request_load(slot, &directory),
            ViewerEvent::SliceChanged { plane, value } => {
                if self.consume_echo(Control::Slice(plane), value) {
                    return Ok(Outcome::Ignored(Ignored::ControllerEcho));
                }
                self.on_slice_slider(plane, value)
            }
            ViewerEvent::OpacityChanged { slot, value } => {
                if self.consume_echo(Control::Opacity(slot), value) {
                    return Ok(Outcome::Ignored(Ignored::ControllerEcho));
                }
                self.on_opacity_slider(slot, value)
            }
            ViewerEvent::ColorChoiceChanged { slot, choice } => self.on_color_choice(slot, choice),
            ViewerEvent::SliceColorChoiceChanged { slot, choice } => {
                self.on_slice_color_choice(slot, choice)
            }
        }
    }

    /// Loads `directory` into `slot`.
    ///
    /// The slot's previous pipelines stay active until the new set is fully
    /// built; a failed load leaves the slot exactly as it was.
    pub fn request_load(&mut self, slot: SlotId, directory: &Path) -> Result<Outcome, ViewerError> {
        if is_cancelled(directory) {
            debug!(%slot, "directory selection cancelled");
            return Ok(Outcome::Ignored(Ignored::Cancelled));
        }
        if !is_valid_directory(directory) {
            warn!(%slot, directory = %directory.display(), "invalid directory");
            return Err(ViewerError::InvalidDirectory(directory.to_path_buf()));
        }

        let previous = self.slots[slot.index()].state;
        self.slots[slot.index()].state = SlotState::Loading;
        info!(%slot, directory = %directory.display(), "loading");
        let started = Instant::now();

        let pipelines = match self.build_pipelines(slot, directory) {
            Ok(pipelines) => pipelines,
            Err(err) => {
                self.slots[slot.index()].state = previous;
                error!(%slot, "{err}");
                self.ui.show_message(&err.to_string());
                return Err(err);
            }
        };

        let defaults = *self.config.slot(slot);
        let display_name = pipelines
            .volume()
            .patient_identifier()
            .unwrap_or(ANONYMOUS_PATIENT)
            .to_owned();
        let dimensions = pipelines.volume().dimensions();

        let state = &mut self.slots[slot.index()];
        state.pipelines = Some(pipelines);
        state.directory = Some(directory.to_path_buf());
        state.display_name = display_name;
        state.opacity = defaults.opacity_percent as f32 / 100.0;
        state.slice_color = defaults.slice_color;
        state.volume_color = defaults.volume_color;
        state.state = SlotState::Loaded;
        self.compositor.attach_slot(slot);

        info!(
            %slot,
            ?dimensions,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "loaded {}",
            self.slots[slot.index()].display_name
        );

        self.ui
            .set_display_name(slot, &self.slots[slot.index()].display_name);
        self.ui.set_slider_range(Control::Opacity(slot), 0, 100);
        self.set_slider(Control::Opacity(slot), defaults.opacity_percent);
        self.ui.set_label_text(
            Label::Opacity(slot),
            &format!("{}%", defaults.opacity_percent),
        );
        self.ui
            .set_color_choice(slot, ColorTarget::Slices, defaults.slice_color);
        self.ui
            .set_color_choice(slot, ColorTarget::Volume, defaults.volume_color);
        self.reset_slice_sliders();

        for surface in Surface::ALL {
            self.render(surface)?;
        }
        Ok(Outcome::Applied)
    }

    /// Moves `plane` to `value` in every loaded slot.
    ///
    /// Each slot checks `value` against its own depth range, so with two
    /// differently sized volumes the smaller one may reject it.
    pub fn on_slice_slider(&mut self, plane: Orientation, value: i32) -> Result<Outcome, ViewerError> {
        if !self.slots.iter().any(DatasetSlot::is_loaded) {
            debug!(%plane, value, "slice slider moved with no data loaded");
            return Ok(Outcome::Ignored(Ignored::SlotNotLoaded));
        }

        let mut applied = false;
        let mut failure = None;
        for slot in &mut self.slots {
            let id = slot.id;
            let Some(pipelines) = slot.loaded_pipelines_mut() else {
                continue;
            };
            let pipeline = pipelines.slice_mut(plane);
            if let Err(err) = pipeline.set_offset(value) {
                warn!(slot = %id, %plane, "{err}");
                continue;
            }
            match pipeline.update() {
                Ok(()) => applied = true,
                Err(err) => {
                    error!(slot = %id, %plane, "reslice failed: {err}");
                    failure.get_or_insert(err);
                }
            }
        }

        if applied {
            self.render(plane.surface())?;
            let max = self.slider_max[plane.index()];
            self.ui
                .set_label_text(Label::SliceIndex(plane), &format!("{value} / {max}"));
        }
        match (applied, failure) {
            (_, Some(err)) => Err(err.into()),
            (true, None) => Ok(Outcome::Applied),
            (false, None) => Ok(Outcome::Ignored(Ignored::OutOfRange)),
        }
    }

    /// Applies `value` percent opacity to the slot's three slice actors.
    pub fn on_opacity_slider(&mut self, slot: SlotId, value: i32) -> Result<Outcome, ViewerError> {
        if !(0..=100).contains(&value) {
            warn!(%slot, value, "opacity outside 0..=100");
            return Ok(Outcome::Ignored(Ignored::OutOfRange));
        }
        let state = &mut self.slots[slot.index()];
        let Some(pipelines) = state.loaded_pipelines_mut() else {
            debug!(%slot, value, "opacity changed before load");
            return Ok(Outcome::Ignored(Ignored::SlotNotLoaded));
        };
        let opacity = value as f32 / 100.0;
        for pipeline in pipelines.slices_mut() {
            pipeline.set_opacity(opacity);
        }
        state.opacity = opacity;

        self.ui
            .set_label_text(Label::Opacity(slot), &format!("{value}%"));
        for surface in Surface::SLICES {
            self.render(surface)?;
        }
        Ok(Outcome::Applied)
    }

    /// Rebinds the slot's volume colour curve.
    pub fn on_color_choice(&mut self, slot: SlotId, choice: ColorChoice) -> Result<Outcome, ViewerError> {
        let state = &mut self.slots[slot.index()];
        let Some(pipelines) = state.loaded_pipelines_mut() else {
            debug!(%slot, %choice, "volume colour changed before load");
            return Ok(Outcome::Ignored(Ignored::SlotNotLoaded));
        };
        let curve = self.catalog.transfer_curve(choice.transfer_curve_name())?;
        pipelines.volume_pipeline_mut().set_color_curve(curve);
        state.volume_color = choice;

        self.render(Surface::Volume)?;
        Ok(Outcome::Applied)
    }

    /// Rebinds the lookup table of the slot's three cross-sections.
    pub fn on_slice_color_choice(
        &mut self,
        slot: SlotId,
        choice: ColorChoice,
    ) -> Result<Outcome, ViewerError> {
        let state = &mut self.slots[slot.index()];
        let Some(pipelines) = state.loaded_pipelines_mut() else {
            debug!(%slot, %choice, "slice colour changed before load");
            return Ok(Outcome::Ignored(Ignored::SlotNotLoaded));
        };
        let lookup = self.catalog.lookup_table(choice.lookup_table_name())?;
        for pipeline in pipelines.slices_mut() {
            pipeline.apply_color_map(lookup);
        }
        state.slice_color = choice;

        for surface in Surface::SLICES {
            self.render(surface)?;
        }
        Ok(Outcome::Applied)
    }

    /// Builds a slot's pipelines from `directory` with the slot's default
    /// colours and opacity applied, without touching the slot itself.
    fn build_pipelines(&self, slot: SlotId, directory: &Path) -> Result<SlotPipelines, ViewerError> {
        let volume = self
            .source
            .load(directory)
            .map_err(|source| ViewerError::Load { slot, source })?;
        let mut pipelines = SlotPipelines::build(Arc::new(volume))?;

        let defaults = self.config.slot(slot);
        let lookup = self.catalog.lookup_table(defaults.slice_color.lookup_table_name())?;
        let curve = self
            .catalog
            .transfer_curve(defaults.volume_color.transfer_curve_name())?;
        let opacity = defaults.opacity_percent as f32 / 100.0;
        for pipeline in pipelines.slices_mut() {
            pipeline.apply_color_map(lookup);
            pipeline.set_opacity(opacity);
        }
        pipelines.volume_pipeline_mut().set_color_curve(curve);
        Ok(pipelines)
    }

    /// Sizes each slice slider to the deepest loaded volume and moves every
    /// loaded slot back to offset 0 so views agree with the sliders.
    fn reset_slice_sliders(&mut self) {
        for plane in Orientation::ALL {
            let mut max = 0;
            for slot in &mut self.slots {
                let id = slot.id;
                let Some(pipelines) = slot.loaded_pipelines_mut() else {
                    continue;
                };
                let pipeline = pipelines.slice_mut(plane);
                max = max.max(pipeline.offset_range().1);
                if let Err(err) = pipeline.set_offset(0).and_then(|()| pipeline.update()) {
                    warn!(slot = %id, %plane, "could not reset slice: {err}");
                }
            }
            self.slider_max[plane.index()] = max;
            self.ui.set_slider_range(Control::Slice(plane), 0, max);
            self.set_slider(Control::Slice(plane), 0);
            self.ui
                .set_label_text(Label::SliceIndex(plane), &format!("0 / {max}"));
        }
    }

    fn set_slider(&mut self, control: Control, value: i32) {
        self.pending_echoes.insert(control, value);
        self.ui.set_slider_value(control, value);
    }

    /// Whether `value` is the echo of the last programmatic update of `control`.
    /// Any event for the control clears the expectation.
    fn consume_echo(&mut self, control: Control, value: i32) -> bool {
        self.pending_echoes.remove(&control) == Some(value)
    }

    fn render(&mut self, surface: Surface) -> Result<(), RenderError> {
        let [first, second] = &self.slots;
        self.compositor
            .render(surface, [first.loaded_pipelines(), second.loaded_pipelines()])
    }
}

/// An empty or self-referential path is what a cancelled chooser returns.
fn is_cancelled(directory: &Path) -> bool {
    directory.as_os_str().is_empty() || directory == Path::new(".")
}

fn is_valid_directory(directory: &Path) -> bool {
    std::fs::read_dir(directory)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}
