use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityParseError {
    #[error("unrecognized cpu quantity {0:?}")]
    Cpu(String),
    #[error("unrecognized memory quantity {0:?}")]
    Memory(String),
}

/// Parse a metrics-API CPU quantity into nanocores.
///
/// The metrics server reports nanocores (`n`), but `u`, `m` and bare core
/// counts are accepted as well so a differently-configured metrics source
/// does not break the report.
pub fn parse_cpu_to_nanocores(q: &str) -> Result<i64, QuantityParseError> {
    let q = q.trim();
    if q.is_empty() {
        return Err(QuantityParseError::Cpu(q.to_string()));
    }
    if let Some(stripped) = q.strip_suffix('n') {
        if let Ok(nanos) = stripped.parse::<i64>() {
            return Ok(nanos);
        }
    } else if let Some(stripped) = q.strip_suffix('u') {
        if let Ok(micros) = stripped.parse::<i64>() {
            return Ok(micros * 1_000);
        }
    } else if let Some(stripped) = q.strip_suffix('m') {
        if let Ok(mc) = stripped.parse::<i64>() {
            return Ok(mc * 1_000_000);
        }
    } else if let Ok(cores) = q.parse::<f64>() {
        // bare cores, integer or float
        return Ok((cores * 1e9).round() as i64);
    }
    Err(QuantityParseError::Cpu(q.to_string()))
}

/// Parse a node status CPU quantity into vCPUs.
///
/// Capacity is a bare integer on EKS, but allocatable CPU commonly carries a
/// millicore suffix (system reservations subtracted), so `m` is accepted too.
pub fn parse_cpu_to_vcpus(q: &str) -> Result<f64, QuantityParseError> {
    let q = q.trim();
    if q.is_empty() {
        return Err(QuantityParseError::Cpu(q.to_string()));
    }
    if let Some(stripped) = q.strip_suffix('m') {
        if let Ok(mc) = stripped.parse::<f64>() {
            return Ok(mc / 1000.0);
        }
    } else if let Ok(cores) = q.parse::<f64>() {
        return Ok(cores);
    }
    Err(QuantityParseError::Cpu(q.to_string()))
}

/// Parse a memory quantity into kilobytes, where `Ki` maps 1:1.
///
/// Recognizes the full Kubernetes suffix set instead of blindly stripping
/// two characters; a bare number is taken as bytes.
pub fn parse_memory_to_kilobytes(q: &str) -> Result<i64, QuantityParseError> {
    let q = q.trim();
    if q.is_empty() {
        return Err(QuantityParseError::Memory(q.to_string()));
    }

    // Order matters: check binary suffixes first (Ki, Mi, ...), then decimal (K, M, ...)
    const BINARY_UNITS: &[(&str, i64)] = &[
        ("Ki", 1024),
        ("Mi", 1024 * 1024),
        ("Gi", 1024 * 1024 * 1024),
        ("Ti", 1024_i64.pow(4)),
        ("Pi", 1024_i64.pow(5)),
        ("Ei", 1024_i64.pow(6)),
    ];
    const DECIMAL_UNITS: &[(&str, i64)] = &[
        ("K", 1000),
        ("M", 1000 * 1000),
        ("G", 1000 * 1000 * 1000),
        ("T", 1000_i64.pow(4)),
        ("P", 1000_i64.pow(5)),
        ("E", 1000_i64.pow(6)),
        ("k", 1000),
    ];

    for (suf, bytes_per_unit) in BINARY_UNITS {
        if let Some(stripped) = q.strip_suffix(suf) {
            if let Ok(v) = stripped.parse::<f64>() {
                return Ok((v * (*bytes_per_unit as f64) / 1024.0).round() as i64);
            }
        }
    }
    for (suf, bytes_per_unit) in DECIMAL_UNITS {
        if let Some(stripped) = q.strip_suffix(suf) {
            if let Ok(v) = stripped.parse::<f64>() {
                return Ok((v * (*bytes_per_unit as f64) / 1024.0).round() as i64);
            }
        }
    }
    // bare bytes
    if let Ok(v) = q.parse::<f64>() {
        return Ok((v / 1024.0).round() as i64);
    }
    Err(QuantityParseError::Memory(q.to_string()))
}

/// Decimal gigabytes: the divisor is 1e6 on purpose, matching the figures
/// the report has always shown.
pub fn kilobytes_to_gigabytes(kilobytes: i64) -> f64 {
    kilobytes as f64 / 1e6
}

pub fn nanocores_to_millicores(nanocores: i64) -> f64 {
    nanocores as f64 * 1e-6
}

pub fn vcpu_to_millicores(vcpus: f64) -> i64 {
    (vcpus * 1000.0) as i64
}
