//! Demo remediation tool for the security specialist.

use tracing::debug;

use troupe_core::tool::{
    ParamSpec, ParamType, Tool, ToolArgs, ToolContext, ToolOutcome, ToolSchema,
};

/// Acknowledges a remediation request for the supplied source and report.
///
/// A placeholder for a real remediation backend: it validates its inputs
/// and answers with a fixed acknowledgement instead of rewriting code.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixVulnerability;

impl Tool for FixVulnerability {
    fn name(&self) -> &str {
        "fix_vulnerability"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("Fixes the reported vulnerabilities in the given source code.")
            .with_param(ParamSpec::required("source_code", ParamType::Text))
            .with_param(ParamSpec::required("vulnerability_report", ParamType::Text))
    }

    fn call(&self, args: ToolArgs, _ctx: &ToolContext) -> ToolOutcome {
        let source = match args.text("source_code") {
            Ok(source) => source,
            Err(err) => return ToolOutcome::invalid_arguments(err.to_string()),
        };
        let report = match args.text("vulnerability_report") {
            Ok(report) => report,
            Err(err) => return ToolOutcome::invalid_arguments(err.to_string()),
        };

        debug!(
            source_bytes = source.len(),
            report_bytes = report.len(),
            "Remediation requested"
        );
        ToolOutcome::success("Source code was fixed using the vulnerability report.")
    }
}
