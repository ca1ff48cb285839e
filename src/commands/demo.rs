//! Legacy ERP integration showcase
//!
//! Walks through the business operations of a legacy ERP whose
//! authentication now lives in the external auth service: every
//! privileged operation goes through the [`AuthorizationGate`], which
//! revalidates the token before looking at the role.

use std::time::Duration;

use crate::commands::health::print_health_report;
use crate::commands::narrate_login;
use crate::commands::rate_limit::print_rate_limit_report;
use crate::config::Config;
use crate::console::{advice, print_heading, print_step, Status};
use crate::error::{FailureKind, Result};
use crate::gate::{AuthorizationGate, Denial};
use crate::permissions::Permission;
use crate::probe::{HealthProbe, RateLimitProbe};
use crate::session::SessionClient;

/// Legacy ERP operations guarded by the authorization gate
///
/// Each operation returns `true` when it was allowed to run.
#[derive(Debug)]
pub struct LegacyErp {
    gate: AuthorizationGate,
    payment_delay: Duration,
}

impl LegacyErp {
    /// Creates the ERP facade
    ///
    /// # Arguments
    ///
    /// * `gate` - Gate used for every privileged operation
    /// * `payment_delay` - Simulated payment gateway latency
    pub fn new(gate: AuthorizationGate, payment_delay: Duration) -> Self {
        Self {
            gate,
            payment_delay,
        }
    }

    /// Gate backing this facade
    pub fn gate(&self) -> &AuthorizationGate {
        &self.gate
    }

    /// Gate backing this facade, for login and logout
    pub fn gate_mut(&mut self) -> &mut AuthorizationGate {
        &mut self.gate
    }

    async fn authorize(&mut self, permission: Permission) -> bool {
        match self.gate.check(permission.as_str()).await {
            Ok(grant) => {
                print_step(
                    &format!(
                        "Permission check: '{}' for role '{}' = true",
                        grant.permission, grant.role
                    ),
                    Status::Success,
                );
                true
            }
            Err(denial) => {
                print_step(&describe_denial(&denial), denial_status(&denial));
                false
            }
        }
    }

    /// Opens the point-of-sale terminal (requires POS)
    pub async fn open_pos_terminal(&mut self) -> bool {
        print_step("🏪 Attempting to open POS terminal...", Status::Info);

        if self.authorize(Permission::Pos).await {
            print_step(
                "POS terminal access granted - opening interface",
                Status::Success,
            );
            print_step("🖥️  POS terminal ready for transactions", Status::Info);
            true
        } else {
            print_step(
                "POS terminal access denied - insufficient permissions",
                Status::Error,
            );
            print_step(
                "💡 Please login with Cashier, Manager, or Admin role",
                Status::Info,
            );
            false
        }
    }

    /// Processes a payment (requires PAYMENT)
    pub async fn process_payment(&mut self, amount: f64, payment_type: &str) -> bool {
        print_step(
            &format!("💳 Processing {} payment: ${:.2}", payment_type, amount),
            Status::Info,
        );

        if !self.authorize(Permission::Payment).await {
            print_step(
                "Payment processing denied - authentication required",
                Status::Error,
            );
            return false;
        }

        print_step("Payment processing authorized", Status::Success);
        print_step("🔄 Connecting to payment gateway...", Status::Info);
        if !self.payment_delay.is_zero() {
            tokio::time::sleep(self.payment_delay).await;
        }
        print_step(
            &format!("Payment processed successfully: ${:.2}", amount),
            Status::Success,
        );
        true
    }

    /// Generates a business report (requires REPORTS)
    pub async fn generate_report(&mut self, report_type: &str) -> bool {
        print_step(
            &format!("📊 Generating {} report...", report_type),
            Status::Info,
        );

        if self.authorize(Permission::Reports).await {
            print_step(
                &format!("{} report generated successfully", report_type),
                Status::Success,
            );
            true
        } else {
            print_step(
                "Report generation denied - insufficient permissions",
                Status::Error,
            );
            false
        }
    }
}

/// One-line description of a denial, naming its reason
pub fn describe_denial(denial: &Denial) -> String {
    match denial {
        Denial::NotAuthenticated { permission } => {
            format!(
                "Permission denied for '{}' - user not authenticated",
                permission
            )
        }
        Denial::InvalidAuthentication { permission, cause } => format!(
            "Permission denied for '{}' - invalid authentication ({}; {})",
            permission,
            cause.kind(),
            advice(cause.kind())
        ),
        Denial::InsufficientRole { permission, role } => format!(
            "Permission check: '{}' for role '{}' = false",
            permission,
            role.as_deref().unwrap_or("none")
        ),
    }
}

fn denial_status(denial: &Denial) -> Status {
    if denial.kind() == FailureKind::InsufficientRole {
        Status::Warning
    } else {
        Status::Error
    }
}

/// Runs the full showcase
///
/// # Errors
///
/// Returns error only if a client cannot be constructed from `config`;
/// failures of the service itself are narrated, not returned.
pub async fn run_demo(config: &Config) -> Result<()> {
    println!("🚀 Legacy ERP Integration Showcase");
    println!("{}", "=".repeat(50));
    println!("Legacy ERP → modern Auth API, one operation at a time");
    println!("Target API: {}", config.service.base_url);
    println!();

    let session = SessionClient::from_config(&config.service)?;
    let mut erp = LegacyErp::new(
        AuthorizationGate::new(session),
        Duration::from_millis(config.demo.payment_delay_ms),
    );

    print_heading("🔐 Demo 1: User Authentication");
    let logged_in = narrate_login(
        erp.gate_mut().session_mut(),
        &config.demo.username,
        &config.demo.password,
    )
    .await;
    println!();

    if logged_in {
        print_heading("🏪 Demo 2: POS Terminal Access");
        erp.open_pos_terminal().await;
        println!();

        print_heading("💳 Demo 3: Payment Processing");
        erp.process_payment(150.75, "Credit Card").await;
        println!();

        print_heading("📊 Demo 4: Report Generation");
        erp.generate_report("Sales Summary").await;
        println!();

        print_heading("🔍 Demo 5: Token Validation");
        match erp.gate_mut().session_mut().validate_token(None).await {
            Ok(validation) => print_step(
                &format!(
                    "Token valid for user: {} (Role: {})",
                    validation.username.as_deref().unwrap_or("-"),
                    validation.role.as_deref().unwrap_or("-")
                ),
                Status::Success,
            ),
            Err(failure) => print_step(
                &format!("Token validation failed: {}", failure),
                Status::Error,
            ),
        }
        println!();
    } else {
        print_step(
            "Authentication failed - cannot proceed with business operations",
            Status::Error,
        );
        println!();
    }

    print_heading("🚫 Demo 6: Security - Failed Authentication");
    let mut intruder = SessionClient::from_config(&config.service)?;
    narrate_login(&mut intruder, "hacker", "wrongpassword").await;
    println!();

    print_heading("🛡️  Demo 7: Rate Limiting Protection");
    print_step(
        &format!(
            "Attempting {} rapid login attempts to trigger rate limiting...",
            config.probe.attempts
        ),
        Status::Info,
    );
    let rate_report = RateLimitProbe::from_config(config).run().await?;
    print_rate_limit_report(&rate_report);
    println!();

    print_heading("🏥 Demo 8: Health Check Endpoints");
    let health_report = HealthProbe::from_config(config)?.run().await;
    print_health_report(&health_report);

    println!("\n🏁 Demo Complete!");
    println!("{}", "=".repeat(50));
    println!("📋 Integration Summary:");
    println!("✅ Tokens revalidated before every sensitive operation");
    println!("✅ Role-based permissions enforced (Admin, Manager, Cashier, Viewer)");
    println!("✅ Rate limiting distinguished from bad credentials");
    println!("✅ Health checks available for monitoring and load balancers");
    println!("✅ API unavailability reported instead of crashing the ERP");

    Ok(())
}
