use std::path::PathBuf;
use strum::{EnumIter, IntoEnumIterator};

use crate::core::persistence::{cycle, cycle_baud_rate, SerialConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum FormField {
    BaudRate,
    DataBits,
    StopBits,
    Parity,
    FlowControl,
    ProgramPath,
    Save,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    NextField,
    PrevField,
    CycleNext,
    CyclePrev,
    Input(char),
    Backspace,
    Confirm,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    Continue,
    Cancel,
    Save(SerialConfig),
}

/// Editing state of the serial configuration popup.
///
/// Choice fields only ever hold values from their enumerated lists; the
/// program path is free text.
#[derive(Debug, Clone)]
pub struct ConfigForm {
    pub config: SerialConfig,
    pub path_buffer: String,
    pub focus: FormField,
}

impl ConfigForm {
    pub fn new(config: SerialConfig) -> Self {
        let path_buffer = config.putty_path.display().to_string();
        Self {
            config,
            path_buffer,
            focus: FormField::BaudRate,
        }
    }

    fn step_focus(&mut self, forward: bool) {
        let fields: Vec<FormField> = FormField::iter().collect();
        let idx = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        let len = fields.len();
        let next = if forward { (idx + 1) % len } else { (idx + len - 1) % len };
        self.focus = fields[next];
    }

    fn cycle_value(&mut self, forward: bool) {
        let c = &mut self.config;
        match self.focus {
            FormField::BaudRate => c.baudrate = cycle_baud_rate(c.baudrate, forward),
            FormField::DataBits => c.data_bits = cycle(c.data_bits, forward),
            FormField::StopBits => c.stop_bits = cycle(c.stop_bits, forward),
            FormField::Parity => c.parity = cycle(c.parity, forward),
            FormField::FlowControl => c.flow_control = cycle(c.flow_control, forward),
            FormField::Save => self.focus = FormField::Cancel,
            FormField::Cancel => self.focus = FormField::Save,
            FormField::ProgramPath => {}
        }
    }

    /// The record as it would be saved right now.
    pub fn to_config(&self) -> SerialConfig {
        SerialConfig {
            putty_path: PathBuf::from(self.path_buffer.trim()),
            ..self.config.clone()
        }
    }

    pub fn handle(&mut self, action: FormAction) -> FormOutcome {
        match action {
            FormAction::NextField => self.step_focus(true),
            FormAction::PrevField => self.step_focus(false),
            FormAction::CycleNext => self.cycle_value(true),
            FormAction::CyclePrev => self.cycle_value(false),
            FormAction::Input(c) => {
                if self.focus == FormField::ProgramPath {
                    self.path_buffer.push(c);
                }
            }
            FormAction::Backspace => {
                if self.focus == FormField::ProgramPath {
                    self.path_buffer.pop();
                }
            }
            FormAction::Confirm => {
                if self.focus == FormField::Cancel {
                    return FormOutcome::Cancel;
                }
                return FormOutcome::Save(self.to_config());
            }
            FormAction::Cancel => return FormOutcome::Cancel,
        }
        FormOutcome::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::persistence::{Parity, StopBits};

    #[test]
    fn edits_choices_and_path() {
        let mut form = ConfigForm::new(SerialConfig::default());
        form.handle(FormAction::CyclePrev);
        assert_eq!(form.config.baudrate, 57600);

        form.handle(FormAction::NextField);
        form.handle(FormAction::NextField);
        form.handle(FormAction::CycleNext);
        assert_eq!(form.config.stop_bits, StopBits::OnePointFive);

        form.handle(FormAction::NextField);
        form.handle(FormAction::CycleNext);
        assert_eq!(form.config.parity, Parity::Even);

        form.handle(FormAction::NextField);
        form.handle(FormAction::NextField);
        assert_eq!(form.focus, FormField::ProgramPath);
        form.path_buffer.clear();
        for c in "/usr/bin/putty".chars() {
            form.handle(FormAction::Input(c));
        }
        form.handle(FormAction::Backspace);

        match form.handle(FormAction::Confirm) {
            FormOutcome::Save(config) => {
                assert_eq!(config.baudrate, 57600);
                assert_eq!(config.putty_path, PathBuf::from("/usr/bin/putt"));
            }
            other => panic!("expected save, got {other:?}"),
        }
    }

    #[test]
    fn typing_outside_path_field_is_ignored() {
        let mut form = ConfigForm::new(SerialConfig::default());
        let before = form.path_buffer.clone();
        form.handle(FormAction::Input('x'));
        assert_eq!(form.path_buffer, before);
    }

    #[test]
    fn cancel_button_and_escape_discard() {
        let mut form = ConfigForm::new(SerialConfig::default());
        assert_eq!(form.handle(FormAction::Cancel), FormOutcome::Cancel);

        form.focus = FormField::Save;
        form.handle(FormAction::CycleNext);
        assert_eq!(form.focus, FormField::Cancel);
        assert_eq!(form.handle(FormAction::Confirm), FormOutcome::Cancel);
    }

    #[test]
    fn focus_wraps_around() {
        let mut form = ConfigForm::new(SerialConfig::default());
        form.handle(FormAction::PrevField);
        assert_eq!(form.focus, FormField::Cancel);
        form.handle(FormAction::NextField);
        assert_eq!(form.focus, FormField::BaudRate);
    }
}
