use std::fmt::Write;

use wizard_spec::{AnswerSet, InputError, SubmissionState, WizardView, render_json_ui, render_text};

/// Output format for the wizard display.
#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum RenderMode {
    Text,
    Json,
}

/// Prints the engine state between prompts.
pub struct WizardPresenter {
    mode: RenderMode,
    header_printed: bool,
    show_answers_json: bool,
}

impl WizardPresenter {
    pub fn new(mode: RenderMode, show_answers_json: bool) -> Self {
        Self {
            mode,
            header_printed: false,
            show_answers_json,
        }
    }

    pub fn show_header(&mut self, view: &WizardView) {
        if self.header_printed || self.mode == RenderMode::Json {
            return;
        }
        println!("{}", view.form_title);
        if let Some(help) = &view.help {
            println!("{}", help);
        }
        println!("Commands: back, restart, exit. Press Enter to keep the current value.");
        self.header_printed = true;
    }

    pub fn show_view(&self, view: &WizardView) {
        match self.mode {
            RenderMode::Text => println!("{}", render_text(view)),
            RenderMode::Json => println!("{}", render_json_ui(view)),
        }
    }

    pub fn show_prompt(&self, view: &WizardView) {
        match &view.submission {
            SubmissionState::Succeeded { .. } => {
                println!("Type 'restart' to start over, 'edit' to change your answers or 'exit'.")
            }
            SubmissionState::Failed { .. } => {
                println!("Press Enter to retry, 'edit' to change your answers or 'exit'.")
            }
            _ => {
                let back = if view.can_retreat { ", back" } else { "" };
                println!("[{}{}]", view.next_label, back);
            }
        }
    }

    pub fn show_input_error(&self, error: &InputError) {
        eprintln!("Invalid answer: {}", error);
    }

    pub fn show_completion(&self, answer_set: &AnswerSet) {
        if !self.show_answers_json {
            return;
        }
        match answer_set.to_json_pretty() {
            Ok(pretty) => println!("{}", pretty),
            Err(err) => eprintln!("Failed to serialize answers to JSON: {}", err),
        }
        match answer_set.to_cbor() {
            Ok(bytes) => println!("Answers (CBOR hex): {}", encode_hex(&bytes)),
            Err(err) => eprintln!("Failed to serialize answers to CBOR: {}", err),
        }
    }
}

/// A line typed at the wizard prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardInput {
    /// Keep the stored value and move on.
    Next,
    Answer(String),
    Back,
    Restart,
    Edit,
    Exit,
}

impl WizardInput {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" => WizardInput::Next,
            "back" => WizardInput::Back,
            "restart" => WizardInput::Restart,
            "edit" => WizardInput::Edit,
            "exit" | "quit" => WizardInput::Exit,
            _ => WizardInput::Answer(trimmed.to_string()),
        }
    }
}

pub fn encode_hex(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        write!(&mut encoded, "{:02x}", byte).expect("writing to string cannot fail");
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_case_insensitively() {
        assert_eq!(WizardInput::parse("  BACK "), WizardInput::Back);
        assert_eq!(WizardInput::parse(""), WizardInput::Next);
        assert_eq!(WizardInput::parse("quit"), WizardInput::Exit);
        assert_eq!(
            WizardInput::parse(" 0,5 "),
            WizardInput::Answer("0,5".into())
        );
    }

    #[test]
    fn hex_encoding_is_lowercase() {
        assert_eq!(encode_hex(&[0x0a, 0xff]), "0aff");
    }
}
