// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Command implementations

pub mod communities;
pub mod completions;
pub mod export;
pub mod ingest;
pub mod project;
pub mod stats;
