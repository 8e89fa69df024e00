//! Health check command for diagnosing issues
//!
//! The doctor command runs all health checks and reports any issues found.

use std::env;

use super::sync::print_json;
use crate::checks::{CheckContext, Severity, create_default_runner};
use crate::core::error::{ShipError, ShipResult, ValidationError};

/// Run the doctor command to diagnose issues
///
/// Fails with a validation error when any check reports an error
pub fn run_doctor(thorough: bool, json: bool) -> ShipResult<()> {
  let ctx = CheckContext::new(&env::current_dir()?, thorough);

  let runner = create_default_runner();
  let results = runner.run_all(&ctx);
  let errors = results.iter().filter(|r| r.is_blocking()).count();

  if json {
    print_json(&results)?;
  } else {
    println!("🏥 Running health checks...\n");

    println!("📋 Registered checks:");
    for check in runner.checks() {
      let note = if check.is_expensive() && !thorough {
        " (skipped, use --thorough)"
      } else {
        ""
      };
      println!("   • {}: {}{}", check.name(), check.description(), note);
    }
    println!();

    let mut has_warnings = false;
    for result in &results {
      let icon = if result.passed { "✅" } else { "❌" };
      println!("{} {}: {}", icon, result.check_name, result.message);

      if !result.passed {
        if let Some(ref suggestion) = result.suggestion {
          println!("   💡 Fix: {}", suggestion);
        }
        if result.severity == Severity::Warning {
          has_warnings = true;
        }
      }
      println!();
    }

    let passed_count = results.iter().filter(|r| r.passed).count();
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Summary: {}/{} checks passed", passed_count, results.len());

    if errors > 0 {
      println!("\n⚠️  Critical issues found. Please fix errors before releasing.");
    } else if has_warnings {
      println!("\n⚠️  Some warnings found. Consider addressing them.");
    } else {
      println!("\n✨ All checks passed! Your setup looks healthy.");
    }
  }

  if errors > 0 {
    return Err(ShipError::Validation(ValidationError::ChecksFailed { count: errors }));
  }
  Ok(())
}
