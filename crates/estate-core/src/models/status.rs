//! Enumerations for customer and viewing states.
//!
//! The database stores these as small integers; the enums give them names
//! and the validation helpers use their ranges.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stage of a customer in the sales funnel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CustomerStatus {
    /// Newly registered lead
    #[default]
    New = 1,
    /// Being followed up by an agent
    FollowingUp = 2,
    /// Has visited at least one property
    Viewed = 3,
    /// Closed a deal
    Closed = 4,
    /// No longer interested
    Lost = 5,
}

impl CustomerStatus {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 5;

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::New),
            2 => Some(Self::FollowingUp),
            3 => Some(Self::Viewed),
            4 => Some(Self::Closed),
            5 => Some(Self::Lost),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::New => "新客户",
            Self::FollowingUp => "跟进中",
            Self::Viewed => "已带看",
            Self::Closed => "已成交",
            Self::Lost => "已流失",
        }
    }
}

impl fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Outcome of a scheduled viewing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ViewingStatus {
    #[default]
    Scheduled = 1,
    Viewed = 2,
    Cancelled = 3,
    /// The viewing led to a signed deal
    DealClosed = 4,
}

impl ViewingStatus {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 4;

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Scheduled),
            2 => Some(Self::Viewed),
            3 => Some(Self::Cancelled),
            4 => Some(Self::DealClosed),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Scheduled => "待带看",
            Self::Viewed => "已带看",
            Self::Cancelled => "已取消",
            Self::DealClosed => "已成交",
        }
    }
}

impl fmt::Display for ViewingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Customer reaction recorded after a viewing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViewingFeedback {
    NotInterested = 0,
    Interested = 1,
}

impl ViewingFeedback {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::NotInterested),
            1 => Some(Self::Interested),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::NotInterested => "不感兴趣",
            Self::Interested => "有意向",
        }
    }
}

impl fmt::Display for ViewingFeedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
