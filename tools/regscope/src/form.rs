//! Modal input forms
//!
//! A form is a list of text, bounded-integer and select fields with one
//! focused field. Forms only edit their own values; the owner decides what a
//! submitted form means and reports field errors back with [`Form::reject`].

use errors::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Int { min: i64, max: i64 },
    Select { options: Vec<String>, selected: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub label: &'static str,
    pub kind: FieldKind,
    /// Text of text and integer fields
    pub value: String,
    pub error: Option<ValidationError>,
    /// Hidden fields are skipped by focus movement, validation and rendering
    pub hidden: bool,
}

impl Field {
    pub fn text(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            kind: FieldKind::Text,
            value: value.into(),
            error: None,
            hidden: false,
        }
    }

    pub fn int(label: &'static str, value: i64, min: i64, max: i64) -> Self {
        Self {
            label,
            kind: FieldKind::Int { min, max },
            value: value.to_string(),
            error: None,
            hidden: false,
        }
    }

    pub fn select<I, S>(label: &'static str, options: I, selected: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label,
            kind: FieldKind::Select {
                options: options.into_iter().map(Into::into).collect(),
                selected,
            },
            value: String::new(),
            error: None,
            hidden: false,
        }
    }

    /// Text shown for the field
    pub fn display(&self) -> &str {
        match &self.kind {
            FieldKind::Select { options, selected } => {
                options.get(*selected).map(String::as_str).unwrap_or("")
            },
            _ => &self.value,
        }
    }

    fn check(&self) -> Result<(), ValidationError> {
        let FieldKind::Int { min, max } = self.kind else {
            return Ok(());
        };
        let text = self.value.trim();
        if text.is_empty() {
            return Err(ValidationError::Empty);
        }
        let n: i64 = text.parse().map_err(|_| ValidationError::NotANumber)?;
        if n < min || n > max {
            return Err(ValidationError::OutOfRange { min, max });
        }
        Ok(())
    }
}

/// Key input as seen by a form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormInput {
    Next,
    Prev,
    Left,
    Right,
    Char(char),
    Backspace,
    Confirm,
    Cancel,
}

/// Result of feeding one input to a form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEvent {
    None,
    /// The field at this index changed value
    Edited(usize),
    Submit,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    pub title: String,
    fields: Vec<Field>,
    focus: usize,
}

impl Form {
    pub fn new(title: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            title: title.into(),
            fields,
            focus: 0,
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn handle(&mut self, input: FormInput) -> FormEvent {
        let len = self.fields.len();
        if len == 0 {
            return match input {
                FormInput::Confirm => FormEvent::Submit,
                FormInput::Cancel => FormEvent::Cancel,
                _ => FormEvent::None,
            };
        }

        match input {
            FormInput::Next => {
                self.step_focus(1);
                FormEvent::None
            },
            FormInput::Prev => {
                self.step_focus(len - 1);
                FormEvent::None
            },
            FormInput::Left | FormInput::Right => {
                let forward = input == FormInput::Right;
                let field = &mut self.fields[self.focus];
                match &mut field.kind {
                    FieldKind::Select { options, selected } if !options.is_empty() => {
                        let n = options.len();
                        *selected = if forward {
                            (*selected + 1) % n
                        } else {
                            (*selected + n - 1) % n
                        };
                        field.error = None;
                        FormEvent::Edited(self.focus)
                    },
                    _ => FormEvent::None,
                }
            },
            FormInput::Char(c) => {
                let field = &mut self.fields[self.focus];
                if matches!(field.kind, FieldKind::Select { .. }) {
                    return FormEvent::None;
                }
                field.value.push(c);
                field.error = None;
                FormEvent::Edited(self.focus)
            },
            FormInput::Backspace => {
                let field = &mut self.fields[self.focus];
                if field.value.pop().is_some() {
                    field.error = None;
                    FormEvent::Edited(self.focus)
                } else {
                    FormEvent::None
                }
            },
            FormInput::Confirm => FormEvent::Submit,
            FormInput::Cancel => FormEvent::Cancel,
        }
    }

    /// Move focus by `step` (mod field count) to the next visible field
    fn step_focus(&mut self, step: usize) {
        let len = self.fields.len();
        let mut next = self.focus;
        for _ in 0..len {
            next = (next + step) % len;
            if !self.fields[next].hidden {
                self.focus = next;
                return;
            }
        }
    }

    /// Validate the built-in constraints of visible fields, focusing the
    /// first failure
    pub fn check(&mut self) -> Result<(), (usize, ValidationError)> {
        let failure = self
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.hidden)
            .find_map(|(i, f)| f.check().err().map(|e| (i, e)));
        match failure {
            Some((index, err)) => {
                self.reject(index, err.clone());
                Err((index, err))
            },
            None => Ok(()),
        }
    }

    /// Mark a field invalid and move the focus to it
    pub fn reject(&mut self, index: usize, err: ValidationError) {
        if let Some(field) = self.fields.get_mut(index) {
            field.error = Some(err);
            self.focus = index;
        }
    }

    /// First field error as "Label: message"
    pub fn error_message(&self) -> Option<String> {
        self.fields
            .iter()
            .find_map(|f| f.error.as_ref().map(|e| format!("{}: {}", f.label, e)))
    }

    pub fn text(&self, index: usize) -> &str {
        self.fields.get(index).map_or("", |f| f.value.as_str())
    }

    /// Integer value of a field that passed [`Form::check`]
    pub fn int(&self, index: usize) -> i64 {
        self.text(index).trim().parse().unwrap_or_default()
    }

    /// Integer value when the field satisfies its constraints, hidden or not
    pub fn valid_int(&self, index: usize) -> Option<i64> {
        let field = self.fields.get(index)?;
        field.check().ok()?;
        field.value.trim().parse().ok()
    }

    pub fn set_hidden(&mut self, index: usize, hidden: bool) {
        if let Some(field) = self.fields.get_mut(index) {
            field.hidden = hidden;
            if hidden {
                field.error = None;
            }
        }
    }

    pub fn selected(&self, index: usize) -> usize {
        match self.fields.get(index).map(|f| &f.kind) {
            Some(FieldKind::Select { selected, .. }) => *selected,
            _ => 0,
        }
    }

    pub fn set_text(&mut self, index: usize, value: impl Into<String>) {
        if let Some(field) = self.fields.get_mut(index) {
            field.value = value.into();
            field.error = None;
        }
    }

    #[cfg(test)]
    pub fn select(&mut self, index: usize, option: usize) {
        if let Some(Field {
            kind: FieldKind::Select { options, selected },
            ..
        }) = self.fields.get_mut(index)
        {
            if option < options.len() {
                *selected = option;
            }
        }
    }
}
