/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::rest::errors::FlickrError;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{Display, EnumString, IntoStaticStr};

/// Permission a credential holds or a call requires.
///
/// Levels are totally ordered, `None < Read < Write < Delete`, and a higher level implies
/// every lower one. The wire form is the lower-case name.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
    IntoPrimitive,
    TryFromPrimitive,
)]
#[repr(i8)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PermissionLevel {
    None = -1,
    Read = 0,
    Write = 1,
    Delete = 2,
}

impl PermissionLevel {
    /// True when holding `self` is enough for something that requires `required`
    pub fn satisfies(self, required: PermissionLevel) -> bool {
        self >= required
    }

    /// Converts a numeric level, rejecting anything outside `-1..=2`
    pub fn validate(level: i32) -> Result<Self, FlickrError> {
        i8::try_from(level)
            .ok()
            .and_then(|v| PermissionLevel::try_from(v).ok())
            .ok_or_else(|| {
                FlickrError::invalid_argument(format!("permission level {level} is out of range"))
            })
    }

    /// Parses the lower-case wire token. Matching is case sensitive so `"Read"` is an error.
    pub fn parse(text: &str) -> Result<Self, FlickrError> {
        PermissionLevel::from_str(text).map_err(|_| {
            FlickrError::invalid_argument(format!("'{text}' is not a permission level"))
        })
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }

    pub fn level(self) -> i8 {
        self.into()
    }
}
