use std::time::Instant;

use econnect_core::config::{AppConfig, LoadOptions, SmtpConfig, SmtpTls};
use econnect_erp::{ErpApi, HttpErpClient};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, Tokio1Executor};
use secrecy::ExposeSecret;
use serde::Serialize;

use crate::commands::escape_json;

const DOCTOR_PROBE_SERIAL: &str = "__econnect_doctor_probe__";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

impl DoctorCheck {
    fn skipped(name: &'static str, reason: &str) -> Self {
        Self { name, status: CheckStatus::Skipped, details: format!("skipped because {reason}") }
    }
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.extend(run_network_checks(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck::skipped(
                "erp_reachability",
                "configuration did not load",
            ));
            checks.push(DoctorCheck::skipped("smtp_readiness", "configuration did not load"));
        }
    }

    let any_failed = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let overall_status = if any_failed { CheckStatus::Fail } else { CheckStatus::Pass };
    let summary = if any_failed {
        "doctor: one or more readiness checks failed".to_string()
    } else {
        "doctor: all readiness checks passed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn run_network_checks(config: &AppConfig) -> Vec<DoctorCheck> {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            let details = format!("failed to initialize async runtime: {error}");
            return vec![
                DoctorCheck {
                    name: "erp_reachability",
                    status: CheckStatus::Fail,
                    details: details.clone(),
                },
                DoctorCheck { name: "smtp_readiness", status: CheckStatus::Fail, details },
            ];
        }
    };

    runtime.block_on(async {
        vec![check_erp_reachability(config).await, check_smtp_readiness(&config.smtp).await]
    })
}

async fn check_erp_reachability(config: &AppConfig) -> DoctorCheck {
    let client = match HttpErpClient::from_config(&config.erp) {
        Ok(client) => client,
        Err(error) => {
            return DoctorCheck {
                name: "erp_reachability",
                status: CheckStatus::Fail,
                details: error.to_string(),
            };
        }
    };

    let started = Instant::now();
    match client.get_serial_number(DOCTOR_PROBE_SERIAL).await {
        Ok(_) => DoctorCheck {
            name: "erp_reachability",
            status: CheckStatus::Pass,
            details: format!(
                "authenticated read against `{}` succeeded in {} ms",
                client.base_url(),
                started.elapsed().as_millis()
            ),
        },
        Err(error) => DoctorCheck {
            name: "erp_reachability",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

async fn check_smtp_readiness(smtp: &SmtpConfig) -> DoctorCheck {
    if !smtp.enabled {
        return DoctorCheck::skipped("smtp_readiness", "smtp.enabled is false");
    }

    let builder = match smtp.tls {
        SmtpTls::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host),
        SmtpTls::Starttls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host),
    };
    let transport: AsyncSmtpTransport<Tokio1Executor> = match builder {
        Ok(builder) => builder
            .port(smtp.port)
            .credentials(Credentials::new(
                smtp.username.clone(),
                smtp.password.expose_secret().to_string(),
            ))
            .build(),
        Err(error) => {
            return DoctorCheck {
                name: "smtp_readiness",
                status: CheckStatus::Fail,
                details: format!("invalid smtp relay `{}`: {error}", smtp.host),
            };
        }
    };

    match transport.test_connection().await {
        Ok(true) => DoctorCheck {
            name: "smtp_readiness",
            status: CheckStatus::Pass,
            details: format!("connected to {}:{} ({:?})", smtp.host, smtp.port, smtp.tls),
        },
        Ok(false) => DoctorCheck {
            name: "smtp_readiness",
            status: CheckStatus::Fail,
            details: format!("{}:{} refused the connection test", smtp.host, smtp.port),
        },
        Err(error) => DoctorCheck {
            name: "smtp_readiness",
            status: CheckStatus::Fail,
            details: format!("smtp connection failed: {error}"),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}
