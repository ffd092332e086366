//! Generator command line construction.
//!
//! The generator is invoked as
//!
//! ```text
//! <program> <program_args...> quote
//!     --customer <name>
//!     --sap-version <version>
//!     --config-files <path> [<path>...]
//!     --output <store root>
//!     --fields <field> [<field>...]
//!     [--custom-fields <json object>]
//!     [--special-logic <text>]
//!     [--resume <session id> [--fork]]
//! ```
//!
//! Every value is passed as its own argument, never through a shell.

use sapgen_core::GenerationRequest;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Stdio;

/// Subcommand the generator CLI exposes for quote endpoints.
pub const QUOTE_SUBCOMMAND: &str = "quote";

/// Fully resolved generator invocation.
///
/// # Examples
///
/// ```
/// use sapgen_core::{CustomerName, GenerationRequest, SapVersion};
/// use sapgen_runner::GeneratorCommand;
/// use std::path::{Path, PathBuf};
///
/// let request = GenerationRequest::builder(
///     CustomerName::new("acme").unwrap(),
///     SapVersion::Ecc6,
/// )
/// .quote_field("customer_id")
/// .build();
///
/// let command = GeneratorCommand::new(
///     "node",
///     &["/app/dist/cli.js".to_string()],
///     &request,
///     &[PathBuf::from("/tmp/config/VBAK.txt")],
///     Path::new("/output"),
/// );
///
/// assert_eq!(
///     command.display(),
///     "node /app/dist/cli.js quote --customer acme --sap-version ECC6 \
///      --config-files /tmp/config/VBAK.txt --output /output --fields customer_id"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorCommand {
    program: String,
    args: Vec<OsString>,
}

impl GeneratorCommand {
    /// Builds the argument vector for one generation.
    #[must_use]
    pub fn new(
        program: &str,
        program_args: &[String],
        request: &GenerationRequest,
        config_paths: &[PathBuf],
        output_root: &Path,
    ) -> Self {
        let mut args: Vec<OsString> = program_args.iter().map(OsString::from).collect();

        args.push(QUOTE_SUBCOMMAND.into());
        args.push("--customer".into());
        args.push(request.customer.as_str().into());
        args.push("--sap-version".into());
        args.push(request.sap_version.as_str().into());

        args.push("--config-files".into());
        args.extend(config_paths.iter().map(|p| p.as_os_str().to_owned()));

        args.push("--output".into());
        args.push(output_root.as_os_str().to_owned());

        args.push("--fields".into());
        args.extend(request.quote_fields.iter().map(OsString::from));

        if !request.custom_fields.is_empty() {
            // BTreeMap<String, String> always serializes
            let json = serde_json::to_string(&request.custom_fields).unwrap_or_default();
            args.push("--custom-fields".into());
            args.push(json.into());
        }

        if let Some(logic) = request.special_logic.as_deref()
            && !logic.is_empty()
        {
            args.push("--special-logic".into());
            args.push(logic.into());
        }

        if let Some(session) = &request.resume_session_id
            && !session.as_str().is_empty()
        {
            args.push("--resume".into());
            args.push(session.as_str().into());
            if request.fork_session {
                args.push("--fork".into());
            }
        }

        Self {
            program: program.to_string(),
            args,
        }
    }

    /// Program being run.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments after the program.
    #[must_use]
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Returns `true` if `flag` appears among the arguments.
    #[must_use]
    pub fn has_flag(&self, flag: &str) -> bool {
        self.args.iter().any(|a| a == OsStr::new(flag))
    }

    /// Space-joined rendering for logs. Not shell-quoted.
    #[must_use]
    pub fn display(&self) -> String {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().map(|a| a.to_string_lossy().into_owned()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Creates the child process command.
    ///
    /// Standard output and error are piped, standard input is closed, and the
    /// child is killed if the handle is dropped before it exits. On unix the
    /// child leads a new process group whose id equals its pid.
    #[must_use]
    pub fn to_tokio(&self) -> tokio::process::Command {
        let mut command = tokio::process::Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sapgen_core::{CustomerName, SapVersion, SessionId};

    fn args_of(command: &GeneratorCommand) -> Vec<String> {
        command
            .args()
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    fn base_request() -> GenerationRequest {
        GenerationRequest::builder(CustomerName::new("acme").unwrap(), SapVersion::Ecc6)
            .quote_field("customer_id")
            .quote_field("quote_date")
            .quote_field("total_amount")
            .build()
    }

    #[test]
    fn test_required_arguments_in_order() {
        let command = GeneratorCommand::new(
            "node",
            &["/app/dist/cli.js".to_string()],
            &base_request(),
            &[PathBuf::from("/s/config/a.txt"), PathBuf::from("/s/config/b.txt")],
            Path::new("/output"),
        );

        assert_eq!(command.program(), "node");
        assert_eq!(
            args_of(&command),
            vec![
                "/app/dist/cli.js",
                "quote",
                "--customer",
                "acme",
                "--sap-version",
                "ECC6",
                "--config-files",
                "/s/config/a.txt",
                "/s/config/b.txt",
                "--output",
                "/output",
                "--fields",
                "customer_id",
                "quote_date",
                "total_amount",
            ]
        );
        assert!(!command.has_flag("--custom-fields"));
        assert!(!command.has_flag("--special-logic"));
        assert!(!command.has_flag("--resume"));
        assert!(!command.has_flag("--fork"));
    }

    #[test]
    fn test_optional_arguments() {
        let customer = CustomerName::new("acme").unwrap();
        let request = GenerationRequest::builder(customer, SapVersion::S4Hana)
            .quote_field("customer_id")
            .custom_field("ZZPRIORITY", "Priority Level (1-5)")
            .special_logic("Discount over 10% needs approval")
            .resume(SessionId::new("sess-1"), true)
            .build();

        let command = GeneratorCommand::new("gen", &[], &request, &[], Path::new("/out"));
        let args = args_of(&command);

        let custom = args.iter().position(|a| a == "--custom-fields").unwrap();
        let json: serde_json::Value = serde_json::from_str(&args[custom + 1]).unwrap();
        assert_eq!(json["ZZPRIORITY"], "Priority Level (1-5)");

        let logic = args.iter().position(|a| a == "--special-logic").unwrap();
        assert_eq!(args[logic + 1], "Discount over 10% needs approval");

        let resume = args.iter().position(|a| a == "--resume").unwrap();
        assert_eq!(args[resume + 1], "sess-1");
        assert_eq!(args.last().unwrap(), "--fork");
    }

    #[test]
    fn test_fork_without_resume_is_ignored() {
        let mut request = base_request();
        request.fork_session = true;
        request.special_logic = Some(String::new());

        let command = GeneratorCommand::new("gen", &[], &request, &[], Path::new("/out"));
        assert!(!command.has_flag("--fork"));
        assert!(!command.has_flag("--special-logic"));
    }

    #[test]
    fn test_values_are_single_arguments() {
        let mut request = base_request();
        request.special_logic = Some("a; rm -rf / && echo $HOME".to_string());

        let command = GeneratorCommand::new("gen", &[], &request, &[], Path::new("/out"));
        let args = args_of(&command);
        assert!(args.contains(&"a; rm -rf / && echo $HOME".to_string()));
    }
}
