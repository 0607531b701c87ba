// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Upstream image generation providers behind one request/response shape

pub mod openai;
pub mod provider;
pub mod stability;
pub mod types;

pub use openai::{OpenAiImageRequest, OpenAiProvider, OPENAI_SERVICE};
pub use provider::{ImageProvider, ProviderKind};
pub use stability::{StabilityForm, StabilityProvider, STABILITY_SERVICE};
pub use types::{
    ErrorKind, GenerationError, GenerationRequest, GenerationResult, ImageSize, DEFAULT_SIZE,
};
