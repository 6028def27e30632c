use crate::dto::HealthRes;

/// Simple health service shared by any PDS API transport.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    pub fn new() -> Self {
        Self
    }

    /// Static health check; no service state is involved.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "PDS is alive".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_is_ok() {
        let res = HealthService::check_health();
        assert!(res.ok);
        assert!(res.message.contains("alive"));
    }
}
