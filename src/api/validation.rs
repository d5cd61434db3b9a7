use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::models::{AttendanceStatus, Gender, MeetingType, MenteeStatus};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid email regex")
});

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));

/// Accumulated field errors, serialized as `{ field: [messages] }`.
#[derive(Debug, Default, Serialize)]
pub struct ValidationErrors {
    #[serde(flatten)]
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns `Err(self)` when any field error was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

pub fn require(errors: &mut ValidationErrors, field: &str, value: &str, label: &str) {
    if value.trim().is_empty() {
        errors.add(field, format!("{label} wajib diisi."));
    }
}

pub fn max_len(errors: &mut ValidationErrors, field: &str, value: &str, max: usize, label: &str) {
    if value.chars().count() > max {
        errors.add(field, format!("{label} maksimal {max} karakter."));
    }
}

pub fn validate_email(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, "Email wajib diisi.");
    } else if !EMAIL_RE.is_match(value) {
        errors.add(field, "Format email tidak valid.");
    }
}

pub fn validate_password(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.is_empty() {
        errors.add(field, "Kata sandi wajib diisi.");
    } else if value.chars().count() < 8 {
        errors.add(field, "Kata sandi minimal 8 karakter.");
    }
}

/// Parses a gender label, accepting legacy spellings, and records a field
/// error when the label is unknown. Returns the canonical label.
pub fn validate_gender(errors: &mut ValidationErrors, field: &str, value: &str) -> Option<String> {
    if value.trim().is_empty() {
        errors.add(field, "Jenis kelamin wajib diisi.");
        return None;
    }

    match value.parse::<Gender>() {
        Ok(gender) => Some(gender.as_str().to_string()),
        Err(_) => {
            errors.add(field, format!("Jenis kelamin '{value}' tidak dikenali."));
            None
        }
    }
}

pub fn validate_mentee_status(
    errors: &mut ValidationErrors,
    field: &str,
    value: &str,
) -> Option<String> {
    if value.trim().is_empty() {
        errors.add(field, "Status wajib diisi.");
        return None;
    }

    match value.parse::<MenteeStatus>() {
        Ok(status) => Some(status.as_str().to_string()),
        Err(_) => {
            errors.add(field, format!("Status '{value}' tidak dikenali."));
            None
        }
    }
}

pub fn validate_attendance_status(
    errors: &mut ValidationErrors,
    field: &str,
    value: &str,
) -> Option<String> {
    match value.parse::<AttendanceStatus>() {
        Ok(status) => Some(status.as_str().to_string()),
        Err(_) => {
            errors.add(field, format!("Status kehadiran '{value}' tidak dikenali."));
            None
        }
    }
}

pub fn validate_meeting_type(
    errors: &mut ValidationErrors,
    field: &str,
    value: &str,
) -> Option<String> {
    if value.trim().is_empty() {
        errors.add(field, "Jenis pertemuan wajib diisi.");
        return None;
    }

    match value.parse::<MeetingType>() {
        Ok(kind) => Some(kind.as_str().to_string()),
        Err(_) => {
            errors.add(field, format!("Jenis pertemuan '{value}' tidak dikenali."));
            None
        }
    }
}

pub fn validate_date(errors: &mut ValidationErrors, field: &str, value: &str, label: &str) {
    if value.trim().is_empty() {
        errors.add(field, format!("{label} wajib diisi."));
    } else if !DATE_RE.is_match(value) {
        errors.add(field, format!("{label} harus berformat YYYY-MM-DD."));
    }
}

pub fn validate_optional_date(errors: &mut ValidationErrors, field: &str, value: &str, label: &str) {
    if !value.trim().is_empty() && !DATE_RE.is_match(value) {
        errors.add(field, format!("{label} harus berformat YYYY-MM-DD."));
    }
}

pub fn validate_month(errors: &mut ValidationErrors, field: &str, month: u32) {
    if !(1..=12).contains(&month) {
        errors.add(field, "Bulan harus antara 1 dan 12.");
    }
}

pub fn validate_year(errors: &mut ValidationErrors, field: &str, year: i32) {
    if !(2000..=2100).contains(&year) {
        errors.add(field, "Tahun tidak valid.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        let mut errors = ValidationErrors::new();
        validate_email(&mut errors, "email", "mentor@sahabatliqo.id");
        assert!(errors.is_empty());

        let mut errors = ValidationErrors::new();
        validate_email(&mut errors, "email", "not-an-email");
        assert!(!errors.is_empty());

        let mut errors = ValidationErrors::new();
        validate_email(&mut errors, "email", "");
        assert!(!errors.is_empty());
    }

    #[test]
    fn gender_accepts_legacy_labels() {
        let mut errors = ValidationErrors::new();
        assert_eq!(
            validate_gender(&mut errors, "gender", "laki-laki").as_deref(),
            Some("Ikhwan")
        );
        assert_eq!(
            validate_gender(&mut errors, "gender", "Perempuan").as_deref(),
            Some("Akhwat")
        );
        assert!(errors.is_empty());

        assert!(validate_gender(&mut errors, "gender", "lainnya").is_none());
        assert!(!errors.is_empty());
    }

    #[test]
    fn date_format_is_checked() {
        let mut errors = ValidationErrors::new();
        validate_date(&mut errors, "meeting_date", "2025-03-14", "Tanggal");
        assert!(errors.is_empty());

        validate_date(&mut errors, "meeting_date", "14-03-2025", "Tanggal");
        assert!(!errors.is_empty());
    }

    #[test]
    fn errors_collect_per_field() {
        let mut errors = ValidationErrors::new();
        require(&mut errors, "full_name", "", "Nama lengkap");
        validate_password(&mut errors, "password", "short");

        let json = serde_json::to_value(&errors).unwrap();
        assert!(json.get("full_name").is_some());
        assert!(json.get("password").is_some());
    }
}
