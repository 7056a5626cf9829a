use crate::enums::{ColorChoice, ColorTarget, Control, Label, SlotId};

/// Widget setters the controller drives.
///
/// Implementations may report value changes caused by these setters back as
/// ordinary events; the controller recognises and drops those echoes.
pub trait InteractionSurface {
    fn set_slider_range(&mut self, control: Control, min: i32, max: i32);

    fn set_slider_value(&mut self, control: Control, value: i32);

    fn set_label_text(&mut self, label: Label, text: &str);

    fn set_display_name(&mut self, slot: SlotId, text: &str);

    fn set_color_choice(&mut self, slot: SlotId, target: ColorTarget, choice: ColorChoice);

    /// User-visible error message.
    fn show_message(&mut self, text: &str);
}

impl<T: InteractionSurface + ?Sized> InteractionSurface for Box<T> {
    fn set_slider_range(&mut self, control: Control, min: i32, max: i32) {
        (**self).set_slider_range(control, min, max)
    }

    fn set_slider_value(&mut self, control: Control, value: i32) {
        (**self).set_slider_value(control, value)
    }

    fn set_label_text(&mut self, label: Label, text: &str) {
        (**self).set_label_text(label, text)
    }

    fn set_display_name(&mut self, slot: SlotId, text: &str) {
        (**self).set_display_name(slot, text)
    }

    fn set_color_choice(&mut self, slot: SlotId, target: ColorTarget, choice: ColorChoice) {
        (**self).set_color_choice(slot, target, choice)
    }

    fn show_message(&mut self, text: &str) {
        (**self).show_message(text)
    }
}
