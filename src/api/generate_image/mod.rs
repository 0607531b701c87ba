// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image generation API endpoints
//!
//! Provides POST /api/ai/generate, /api/ai/generate/openai and
//! /api/ai/generate/stability.

pub mod handler;

pub use handler::{generate_handler, generate_openai_handler, generate_stability_handler};
