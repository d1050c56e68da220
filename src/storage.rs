// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Persistence of [`LotState`] as a pretty-printed JSON document.
//!
//! Reading is tolerant: object keys are matched case-insensitively, so
//! `Initial_Fee` or `INITIAL_FEE` load as `initial_fee`. Only case differs;
//! other spellings such as `InitialFee` are not recognized. Writing always
//! produces the canonical snake_case form. Documents that parse but break a
//! lot invariant are rejected like malformed ones.

use crate::error::StorageError;
use crate::state::LotState;
use serde_json::Value;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

/// Durable home of the lot state.
pub trait Storage {
    /// Reads the last saved state.
    ///
    /// # Errors
    ///
    /// Any [`StorageError`] means "no usable prior state".
    fn load(&self) -> Result<LotState, StorageError>;

    /// Replaces the stored state with `state`.
    fn save(&self, state: &LotState) -> Result<(), StorageError>;
}

impl<S: Storage + ?Sized> Storage for &S {
    fn load(&self) -> Result<LotState, StorageError> {
        (**self).load()
    }

    fn save(&self, state: &LotState) -> Result<(), StorageError> {
        (**self).save(state)
    }
}

/// Serializes a state to indented JSON.
pub fn encode(state: &LotState) -> Result<String, StorageError> {
    Ok(serde_json::to_string_pretty(state)?)
}

/// Parses a JSON document into a state, ignoring key case.
pub fn decode(text: &str) -> Result<LotState, StorageError> {
    let document: Value = serde_json::from_str(text)?;
    let state: LotState = serde_json::from_value(fold_keys(document))?;
    state.validated()
}

/// Lowercases every object key, recursively.
fn fold_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key.to_lowercase(), fold_keys(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(fold_keys).collect()),
        other => other,
    }
}

/// State file on the local filesystem.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for JsonFileStorage {
    fn load(&self) -> Result<LotState, StorageError> {
        let text = fs::read_to_string(&self.path)?;
        decode(&text)
    }

    fn save(&self, state: &LotState) -> Result<(), StorageError> {
        let text = encode(state)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

/// In-process storage holding the encoded document.
///
/// Goes through the same codec as [`JsonFileStorage`], so it exercises the
/// real document format without touching the disk.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    document: RefCell<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing document, valid or not.
    pub fn with_document(text: impl Into<String>) -> Self {
        Self {
            document: RefCell::new(Some(text.into())),
        }
    }

    /// The last document written, if any.
    pub fn document(&self) -> Option<String> {
        self.document.borrow().clone()
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> Result<LotState, StorageError> {
        match self.document.borrow().as_deref() {
            Some(text) => decode(text),
            None => Err(StorageError::Empty),
        }
    }

    fn save(&self, state: &LotState) -> Result<(), StorageError> {
        *self.document.borrow_mut() = Some(encode(state)?);
        Ok(())
    }
}
