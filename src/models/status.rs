use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ParseLabelError;

/// Mentee lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenteeStatus {
    Aktif,
    #[serde(rename = "Non-Aktif")]
    NonAktif,
    Lulus,
}

impl MenteeStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Aktif => "Aktif",
            Self::NonAktif => "Non-Aktif",
            Self::Lulus => "Lulus",
        }
    }
}

impl fmt::Display for MenteeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MenteeStatus {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "aktif" => Ok(Self::Aktif),
            "non-aktif" | "non aktif" | "nonaktif" => Ok(Self::NonAktif),
            "lulus" => Ok(Self::Lulus),
            _ => Err(ParseLabelError::new("status", s)),
        }
    }
}

/// Per-mentee attendance status for one meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Hadir,
    Sakit,
    Izin,
    Alpa,
}

impl AttendanceStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hadir => "Hadir",
            Self::Sakit => "Sakit",
            Self::Izin => "Izin",
            Self::Alpa => "Alpa",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hadir" => Ok(Self::Hadir),
            "sakit" => Ok(Self::Sakit),
            "izin" => Ok(Self::Izin),
            "alpa" | "alfa" => Ok(Self::Alpa),
            _ => Err(ParseLabelError::new("status", s)),
        }
    }
}

/// How a meeting was held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeetingType {
    Online,
    Offline,
    Assignment,
}

impl MeetingType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Online => "Online",
            Self::Offline => "Offline",
            Self::Assignment => "Assignment",
        }
    }
}

impl fmt::Display for MeetingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeetingType {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "online" | "daring" => Ok(Self::Online),
            "offline" | "luring" => Ok(Self::Offline),
            "assignment" | "penugasan" | "tugas" => Ok(Self::Assignment),
            _ => Err(ParseLabelError::new("meeting_type", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mentee_status_labels() {
        assert_eq!("non aktif".parse::<MenteeStatus>().unwrap(), MenteeStatus::NonAktif);
        assert_eq!(MenteeStatus::NonAktif.as_str(), "Non-Aktif");
        assert!("wisuda".parse::<MenteeStatus>().is_err());
    }

    #[test]
    fn test_attendance_status_labels() {
        assert_eq!("HADIR".parse::<AttendanceStatus>().unwrap(), AttendanceStatus::Hadir);
        assert_eq!("alfa".parse::<AttendanceStatus>().unwrap(), AttendanceStatus::Alpa);
        assert!("bolos".parse::<AttendanceStatus>().is_err());
    }

    #[test]
    fn test_meeting_type_labels() {
        assert_eq!("daring".parse::<MeetingType>().unwrap(), MeetingType::Online);
        assert_eq!("Assignment".parse::<MeetingType>().unwrap(), MeetingType::Assignment);
    }
}
