//! Connector functions
//!
//! Database, file, mail, directory, XML and signing functions need a host
//! with live endpoints. The catalog knows their signatures so scripts using
//! them still type-check; calling one fails.

use crate::error::{Result, ScriptError};
use crate::scope::Scope;
use crate::signature::{any, Parameter, Signature};
use crate::stdlib::{analyze_unimplemented, Args, Builtin};
use crate::value::{Value, ValueKind};

fn unimplemented(args: &mut Args, _: &mut Scope) -> Result<Value> {
    tracing::warn!(function = args.function(), "connector function called without a host");
    Err(ScriptError::Unimplemented(args.function().to_string()))
}

fn connector(name: &'static str, signature: Signature) -> Builtin {
    Builtin::new(name, signature, unimplemented).analyze_with(analyze_unimplemented)
}

/// Initialize the connector stubs
pub fn init() -> Vec<Builtin> {
    vec![
        // DBLookup(databaseId, sql) -> string
        connector(
            "DBLookup",
            Signature::new(
                ValueKind::String,
                vec![
                    Parameter::required("databaseId", ValueKind::String),
                    Parameter::required("sql", ValueKind::String),
                ],
            ),
        ),
        // DBExecute(databaseId, sql[, outputVariable, ...]) -> array
        connector(
            "DBExecute",
            Signature::new(
                ValueKind::Array,
                vec![
                    Parameter::required("databaseId", ValueKind::String),
                    Parameter::required("sql", ValueKind::String),
                    Parameter::optional("outputVariable", ValueKind::String),
                ],
            )
            .variadic(),
        ),
        // ReadFile(sourceId[, fileFilter]) -> string
        connector(
            "ReadFile",
            Signature::new(
                ValueKind::String,
                vec![
                    Parameter::required("sourceId", ValueKind::String),
                    Parameter::optional("fileFilter", ValueKind::String),
                ],
            ),
        ),
        // WriteFile(targetId, fileContents[, filename]) -> void
        connector(
            "WriteFile",
            Signature::new(
                ValueKind::Void,
                vec![
                    Parameter::required("targetId", ValueKind::String),
                    Parameter::required("fileContents", any()),
                    Parameter::optional("filename", ValueKind::String),
                ],
            ),
        ),
        // SendEmail(from, to, subject, message[, ...]) -> string
        connector(
            "SendEmail",
            Signature::new(
                ValueKind::String,
                vec![
                    Parameter::required("from", ValueKind::String),
                    Parameter::required("to", ValueKind::String),
                    Parameter::required("subject", ValueKind::String),
                    Parameter::required("message", ValueKind::String),
                    Parameter::optional("smtpServers", ValueKind::String),
                    Parameter::optional("account", ValueKind::String),
                    Parameter::optional("accountPassword", ValueKind::String),
                    Parameter::optional("cc", ValueKind::String),
                    Parameter::optional("bcc", ValueKind::String),
                    Parameter::optional("replyTo", ValueKind::String),
                    Parameter::optional("useSSL", ValueKind::Bool),
                ],
            ),
        ),
        // LDAPSearch(path, filter, detail, attribute, ...) -> array
        connector(
            "LDAPSearch",
            Signature::new(
                ValueKind::Array,
                vec![
                    Parameter::required("path", ValueKind::String),
                    Parameter::required("filter", ValueKind::String),
                    Parameter::required("detail", ValueKind::Number),
                    Parameter::optional("attribute", ValueKind::String),
                ],
            )
            .variadic(),
        ),
        // SelectNodes(node, xPath[, prefix, ...]) -> array
        connector(
            "SelectNodes",
            Signature::new(
                ValueKind::Array,
                vec![
                    Parameter::required("node", any()),
                    Parameter::required("xPath", ValueKind::String),
                    Parameter::optional("prefix", ValueKind::String),
                ],
            )
            .variadic(),
        ),
        // HMACSHA256(message, key) -> string
        connector(
            "HMACSHA256",
            Signature::new(
                ValueKind::String,
                vec![
                    Parameter::required("message", ValueKind::String),
                    Parameter::required("key", ValueKind::String),
                ],
            ),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expr;
    use crate::interpreter::Interpreter;
    use crate::typechecker::check_program;
    use crate::types::StaticType;

    #[test]
    fn test_connectors_fail_at_runtime() {
        let result = Interpreter::new().eval(&Expr::call(
            "DBLookup",
            vec![Expr::string("db"), Expr::string("select 1")],
        ));
        assert_eq!(result, Err(ScriptError::Unimplemented("DBLookup".to_string())));
    }

    #[test]
    fn test_connectors_type_check_with_warning() {
        let analysis = check_program(&Expr::call(
            "ReadFile",
            vec![Expr::string("source")],
        ))
        .unwrap();
        assert_eq!(analysis.typed.ty(), StaticType::String);
        assert!(!analysis.has_errors());
        let warning = analysis.warnings().next().unwrap();
        assert!(warning.message.contains("ReadFile is not implemented"));
    }

    #[test]
    fn test_connector_arity_still_checked() {
        let analysis = check_program(&Expr::call("HMACSHA256", vec![Expr::string("m")])).unwrap();
        assert!(analysis.has_errors());
    }
}
