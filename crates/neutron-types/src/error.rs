// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Error
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Invalid geometry for id {id}: {message}")]
    InvalidGeometry { id: i32, message: String },

    #[error("Numeric failure at iteration {iteration}: {message}")]
    NumericFailure { iteration: usize, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Point ({x}, {y}) is not contained in the geometry")]
    PointNotFound { x: f64, y: f64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type TransportResult<T> = Result<T, TransportError>;
