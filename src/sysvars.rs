//! System variable registry
//!
//! Read-only catalog of the `$jitterbit.*` variables the host sets or reads
//! around a script run. Most entries have a fixed name. Extendable entries
//! are prefixes that take a user-chosen suffix after a `.` separator, e.g.
//! `$jitterbit.api.request.headers.x_forwarded_for`.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::types::StaticType;

/// Who writes the variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SysVarAccess {
    /// Set by the host, read by scripts
    Informational,
    /// Read by the host, scripts may set it
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SysVarType {
    String,
    Integer,
    Boolean,
    Array,
}

impl SysVarType {
    pub fn static_type(self) -> StaticType {
        match self {
            SysVarType::String => StaticType::String,
            SysVarType::Integer => StaticType::Number,
            SysVarType::Boolean => StaticType::Bool,
            SysVarType::Array => StaticType::Array,
        }
    }
}

/// One registry entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemVariable {
    pub name: Cow<'static, str>,
    pub module: &'static str,
    pub access: SysVarAccess,
    pub data_type: SysVarType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
    pub description: &'static str,
}

impl fmt::Display for SystemVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:?}, {:?}, module {})",
            self.name, self.data_type, self.access, self.module
        )?;
        if let Some(default) = self.default {
            write!(f, " default {}", default)?;
        }
        write!(f, ": {}", self.description)
    }
}

macro_rules! sysvar {
    ($name:expr, $module:expr, $access:ident, $ty:ident, $default:expr, $desc:expr) => {
        SystemVariable {
            name: Cow::Borrowed($name),
            module: $module,
            access: SysVarAccess::$access,
            data_type: SysVarType::$ty,
            default: $default,
            description: $desc,
        }
    };
}

static FIXED: &[SystemVariable] = &[
    // API
    sysvar!("$jitterbit.api.request", "API", Informational, String, None, "Full payload of the request that triggered the operation"),
    sysvar!("$jitterbit.api.request.body", "API", Informational, String, None, "Body of the API request"),
    sysvar!("$jitterbit.api.request.method", "API", Informational, String, None, "HTTP method of the API request"),
    sysvar!("$jitterbit.api.request.url", "API", Informational, String, None, "URL the API request was made to"),
    sysvar!("$jitterbit.api.response", "API", Settings, String, None, "Response body returned to the API caller"),
    sysvar!("$jitterbit.api.response.status_code", "API", Settings, Integer, Some("200"), "HTTP status code returned to the API caller"),
    sysvar!("$jitterbit.api.response.blank_to_null", "API", Settings, Boolean, Some("false"), "Return empty response bodies as null"),
    sysvar!("$jitterbit.api.request.enum.headers", "API", Informational, Array, None, "Names of the headers sent with the API request"),
    sysvar!("$jitterbit.api.request.enum.parameters", "API", Informational, Array, None, "Names of the query parameters of the API request"),
    sysvar!("$jitterbit.api.request.enum.mvparams", "API", Informational, Array, None, "Names of the multi-valued query parameters of the API request"),
    sysvar!("$jitterbit.api.request.content_type", "API", Informational, String, None, "Content type of the API request body"),
    sysvar!("$jitterbit.api.request.remote_address", "API", Informational, String, None, "Address of the API caller"),
    sysvar!("$jitterbit.api.request.path", "API", Informational, String, None, "Path of the API request below the API root"),
    sysvar!("$jitterbit.api.response.content_type", "API", Settings, String, Some("text/plain"), "Content type of the response returned to the API caller"),
    sysvar!("$jitterbit.api.response.include_error_details", "API", Settings, Boolean, Some("false"), "Include the operation error in failed API responses"),
    // Operation
    sysvar!("$jitterbit.operation.name", "Operation", Informational, String, None, "Name of the running operation"),
    sysvar!("$jitterbit.operation.guid", "Operation", Informational, String, None, "Identifier of the running operation"),
    sysvar!("$jitterbit.operation.instance_guid", "Operation", Informational, String, None, "Identifier of this run of the operation"),
    sysvar!("$jitterbit.operation.project_name", "Operation", Informational, String, None, "Name of the project the operation belongs to"),
    sysvar!("$jitterbit.operation.error", "Operation", Settings, String, None, "Error message reported when the operation fails"),
    sysvar!("$jitterbit.operation.last_error", "Operation", Informational, String, None, "Last error raised in the operation chain"),
    sysvar!("$jitterbit.operation.previous.error", "Operation", Informational, String, None, "Error of the previous operation in the chain"),
    sysvar!("$jitterbit.operation.previous.success", "Operation", Informational, Boolean, None, "Whether the previous operation succeeded"),
    sysvar!("$jitterbit.operation.write_history", "Operation", Settings, Boolean, Some("true"), "Record this run in the operation history"),
    sysvar!("$jitterbit.operation.log_level", "Operation", Settings, Integer, Some("1"), "Verbosity of the operation log"),
    sysvar!("$jitterbit.operation.trigger", "Operation", Informational, String, None, "What started the operation"),
    sysvar!("$jitterbit.operation.warning", "Operation", Settings, String, None, "Warning message reported for the operation"),
    sysvar!("$jitterbit.operation.last_warning", "Operation", Informational, String, None, "Last warning raised in the operation chain"),
    sysvar!("$jitterbit.operation.previous.warning", "Operation", Informational, String, None, "Warning of the previous operation in the chain"),
    sysvar!("$jitterbit.operation.root_instance_guid", "Operation", Informational, String, None, "Identifier of the first run in the operation chain"),
    sysvar!("$jitterbit.operation.parent_instance_guid", "Operation", Informational, String, None, "Identifier of the run that started this operation"),
    sysvar!("$jitterbit.operation.start_time", "Operation", Informational, String, None, "UTC time the operation run started"),
    sysvar!("$jitterbit.operation.project_guid", "Operation", Informational, String, None, "Identifier of the project the operation belongs to"),
    sysvar!("$jitterbit.operation.max_run_time", "Operation", Settings, Integer, Some("0"), "Seconds before the run is cancelled, 0 for no limit"),
    sysvar!("$jitterbit.operation.chained", "Operation", Informational, Boolean, None, "Whether the operation was started by another operation"),
    sysvar!("$jitterbit.operation.sleep_seconds", "Operation", Settings, Integer, Some("0"), "Seconds to wait before the next operation in the chain"),
    sysvar!("$jitterbit.operation.disable_success_actions", "Operation", Settings, Boolean, Some("false"), "Skip the on-success actions of this run"),
    sysvar!("$jitterbit.operation.disable_failure_actions", "Operation", Settings, Boolean, Some("false"), "Skip the on-failure actions of this run"),
    sysvar!("$jitterbit.operation.cancel", "Operation", Settings, Boolean, Some("false"), "Stop the operation after the current script"),
    sysvar!("$jitterbit.operation.retry_count", "Operation", Informational, Integer, None, "Number of times this run has been retried"),
    sysvar!("$jitterbit.operation.max_retries", "Operation", Settings, Integer, Some("0"), "Retries of a failed run"),
    // Scripting
    sysvar!("$jitterbit.scripting.db.auto_commit", "Scripting", Settings, Boolean, Some("true"), "Commit after each scripted database statement"),
    sysvar!("$jitterbit.scripting.db.max_rows", "Scripting", Settings, Integer, Some("10000"), "Maximum rows returned by scripted database queries"),
    sysvar!("$jitterbit.scripting.db.rows_affected", "Scripting", Informational, Integer, None, "Rows changed by the last scripted database statement"),
    sysvar!("$jitterbit.scripting.db.transaction", "Scripting", Settings, Boolean, Some("false"), "Run scripted database statements in one transaction"),
    sysvar!("$jitterbit.scripting.hex.enable_null_character", "Scripting", Settings, Boolean, Some("false"), "Allow null characters when converting hex to strings"),
    sysvar!("$jitterbit.scripting.nesting.max", "Scripting", Settings, Integer, Some("50"), "Maximum nesting of RunScript calls"),
    sysvar!("$jitterbit.scripting.while.max_iterations", "Scripting", Settings, Integer, Some("50000"), "Iteration limit of While loops"),
    sysvar!("$jitterbit.scripting.db.search_path", "Scripting", Settings, String, None, "Schema search path of scripted database connections"),
    sysvar!("$jitterbit.scripting.db.character_encoding", "Scripting", Settings, String, None, "Character encoding of scripted database results"),
    sysvar!("$jitterbit.scripting.db.try_reconnect", "Scripting", Settings, Boolean, Some("false"), "Reconnect once when a scripted database connection drops"),
    sysvar!("$jitterbit.scripting.db.preserve_char_whitespace", "Scripting", Settings, Boolean, Some("false"), "Keep trailing whitespace in database CHAR columns"),
    sysvar!("$jitterbit.scripting.ldap.include_dn_in_results", "Scripting", Settings, Boolean, Some("false"), "Return the distinguished name with LDAP search results"),
    sysvar!("$jitterbit.scripting.ldap.return_null_if_no_results", "Scripting", Settings, Boolean, Some("false"), "Return null from LDAP searches without results"),
    sysvar!("$jitterbit.scripting.ldap.max_search_results", "Scripting", Settings, Integer, Some("0"), "Maximum LDAP search results, 0 for no limit"),
    sysvar!("$jitterbit.scripting.ldap.use_json", "Scripting", Settings, Boolean, Some("false"), "Return LDAP search results as JSON"),
    sysvar!("$jitterbit.scripting.email.use_html", "Scripting", Settings, Boolean, Some("false"), "Send scripted email bodies as HTML"),
    sysvar!("$jitterbit.scripting.file.overwrite", "Scripting", Settings, Boolean, Some("true"), "Overwrite existing files written from scripts"),
    sysvar!("$jitterbit.scripting.xml.preserve_namespaces", "Scripting", Settings, Boolean, Some("false"), "Keep namespace prefixes in XML returned by node functions"),
    sysvar!("$jitterbit.scripting.date.default_format", "Scripting", Settings, String, None, "Format used when dates are converted to strings"),
    sysvar!("$jitterbit.scripting.json.output_null", "Scripting", Settings, Boolean, Some("false"), "Write null values when converting to JSON"),
    // Source
    sysvar!("$jitterbit.source.filename", "Source", Informational, String, None, "Name of the file being processed"),
    sysvar!("$jitterbit.source.filenames", "Source", Informational, Array, None, "Names of all files read by the source"),
    sysvar!("$jitterbit.source.size", "Source", Informational, Integer, None, "Size in bytes of the source file"),
    sysvar!("$jitterbit.source.locale", "Source", Settings, String, None, "Locale used to parse source data"),
    sysvar!("$jitterbit.source.file_limit", "Source", Settings, Integer, Some("0"), "Maximum files read per run, 0 for no limit"),
    sysvar!("$jitterbit.source.preserve_char_whitespace", "Source", Settings, Boolean, Some("false"), "Keep whitespace in fixed-width character fields"),
    sysvar!("$jitterbit.source.append_date_to_success_file", "Source", Settings, Boolean, Some("false"), "Append a timestamp to files moved after a successful read"),
    sysvar!("$jitterbit.source.done_file_name", "Source", Settings, String, None, "File that must exist before the source is read"),
    sysvar!("$jitterbit.source.file_list_timeout", "Source", Settings, Integer, Some("0"), "Seconds allowed for listing source files"),
    sysvar!("$jitterbit.source.db.character_encoding", "Source", Settings, String, None, "Character encoding of database source columns"),
    sysvar!("$jitterbit.source.db.schema_name", "Source", Settings, String, None, "Schema of database source tables"),
    sysvar!("$jitterbit.source.db.trim", "Source", Settings, Boolean, Some("false"), "Trim whitespace from database source values"),
    sysvar!("$jitterbit.source.ftp.encoding", "Source", Settings, String, None, "Character encoding of FTP source file names"),
    sysvar!("$jitterbit.source.ftp.transfer_timeout", "Source", Settings, Integer, Some("0"), "Seconds allowed for one FTP download"),
    sysvar!("$jitterbit.source.http.max_redirs", "Source", Settings, Integer, Some("0"), "Redirects followed by HTTP sources"),
    sysvar!("$jitterbit.source.http.ssl_cert_id", "Source", Settings, String, None, "Client certificate used by HTTP sources"),
    sysvar!("$jitterbit.source.http.response_code", "Source", Informational, Integer, None, "HTTP status received by the last HTTP source read"),
    sysvar!("$jitterbit.source.sftp.ssh_key_only", "Source", Settings, Boolean, Some("false"), "Authenticate SFTP sources with keys only"),
    sysvar!("$jitterbit.source.text.character_encoding", "Source", Settings, String, None, "Character encoding of text sources"),
    sysvar!("$jitterbit.source.text.csv_nullable", "Source", Settings, Boolean, Some("false"), "Read empty CSV source fields as null"),
    // Target
    sysvar!("$jitterbit.target.file_count", "Target", Settings, Integer, None, "Number of target files to write"),
    sysvar!("$jitterbit.target.file_share.create_directories", "Target", Settings, Boolean, Some("false"), "Create missing directories on file share targets"),
    sysvar!("$jitterbit.target.ftp.encoding", "Target", Settings, String, None, "Character encoding of FTP target file names"),
    sysvar!("$jitterbit.target.ftp.return_code", "Target", Informational, Integer, None, "Return code of the last FTP upload"),
    sysvar!("$jitterbit.target.http.remove_trailing_linebreaks", "Target", Settings, Boolean, Some("false"), "Strip trailing line breaks from HTTP target bodies"),
    sysvar!("$jitterbit.target.append_date_to_failure_file", "Target", Settings, Boolean, Some("false"), "Append a timestamp to files written after a failure"),
    sysvar!("$jitterbit.target.chunking.uncompressed_size_limit", "Target", Settings, Integer, Some("0"), "Bytes per target chunk, 0 for no limit"),
    sysvar!("$jitterbit.target.db.commit_chunks", "Target", Settings, Boolean, Some("false"), "Commit database targets after each chunk"),
    sysvar!("$jitterbit.target.db.debug_logging", "Target", Settings, Boolean, Some("false"), "Log the statements sent to database targets"),
    sysvar!("$jitterbit.target.db.include_null_in_sql_statement", "Target", Settings, Boolean, Some("false"), "Write null columns explicitly in target statements"),
    sysvar!("$jitterbit.target.db.schema_name", "Target", Settings, String, None, "Schema of database target tables"),
    sysvar!("$jitterbit.target.db.transaction", "Target", Settings, Boolean, Some("true"), "Write database targets in one transaction"),
    sysvar!("$jitterbit.target.db.use_algorithm", "Target", Settings, Boolean, Some("false"), "Choose insert or update per row on database targets"),
    sysvar!("$jitterbit.target.ftp.transfer_timeout", "Target", Settings, Integer, Some("0"), "Seconds allowed for one FTP upload"),
    sysvar!("$jitterbit.target.http.form_data", "Target", Settings, Boolean, Some("false"), "Send HTTP target bodies as form data"),
    sysvar!("$jitterbit.target.http.form_data.filename", "Target", Settings, String, None, "File name of the form data part"),
    sysvar!("$jitterbit.target.http.form_data.name", "Target", Settings, String, None, "Field name of the form data part"),
    sysvar!("$jitterbit.target.http.max_redirs", "Target", Settings, Integer, Some("0"), "Redirects followed by HTTP targets"),
    sysvar!("$jitterbit.target.http.ssl_cert_id", "Target", Settings, String, None, "Client certificate used by HTTP targets"),
    sysvar!("$jitterbit.target.http.status_code", "Target", Informational, Integer, None, "HTTP status returned by the last HTTP target write"),
    sysvar!("$jitterbit.target.sftp.ssh_key_only", "Target", Settings, Boolean, Some("false"), "Authenticate SFTP targets with keys only"),
    sysvar!("$jitterbit.target.text.character_encoding", "Target", Settings, String, None, "Character encoding of text targets"),
    sysvar!("$jitterbit.target.text.csv_nullable", "Target", Settings, Boolean, Some("false"), "Write null CSV target fields as empty"),
    sysvar!("$jitterbit.target.file_share.append", "Target", Settings, Boolean, Some("false"), "Append to existing files on file share targets"),
    // Web service
    sysvar!("$jitterbit.web_service_call.status_code", "Web Service", Informational, Integer, None, "HTTP status of the last web service call"),
    sysvar!("$jitterbit.web_service_call.number_of_retries", "Web Service", Settings, Integer, Some("0"), "Retries for failed web service calls"),
    sysvar!("$jitterbit.web_service_call.retry_wait_seconds", "Web Service", Settings, Integer, Some("60"), "Seconds between web service retries"),
    sysvar!("$jitterbit.web_service_call.time_out", "Web Service", Settings, Integer, None, "Timeout in seconds of web service calls"),
    sysvar!("$jitterbit.web_service_call.ssl_cert_id", "Web Service", Settings, String, None, "Client certificate used for web service calls"),
    sysvar!("$jitterbit.web_service_call.max_redirs", "Web Service", Settings, Integer, Some("0"), "Redirects followed by web service calls"),
    sysvar!("$jitterbit.web_service_call.character_encoding", "Web Service", Settings, String, None, "Character encoding of web service requests"),
    sysvar!("$jitterbit.web_service_call.raw_response", "Web Service", Informational, String, None, "Unparsed body of the last web service response"),
    sysvar!("$jitterbit.web_service_call.keep_raw_response", "Web Service", Settings, Boolean, Some("false"), "Store the unparsed web service response"),
    sysvar!("$jitterbit.web_service_call.soap_action", "Web Service", Settings, String, None, "SOAPAction header of web service calls"),
    sysvar!("$jitterbit.web_service_call.error", "Web Service", Informational, String, None, "Error of the last failed web service call"),
    // Environment
    sysvar!("$jitterbit.environment.name", "Environment", Informational, String, None, "Name of the environment the project runs in"),
    sysvar!("$jitterbit.agent.name", "Environment", Informational, String, None, "Name of the agent running the operation"),
    sysvar!("$jitterbit.organization.id", "Environment", Informational, String, None, "Identifier of the organization"),
    sysvar!("$jitterbit.organization.name", "Environment", Informational, String, None, "Name of the organization"),
    sysvar!("$jitterbit.environment.id", "Environment", Informational, String, None, "Identifier of the environment"),
    sysvar!("$jitterbit.environment.url_prefix", "Environment", Informational, String, None, "URL prefix of the APIs published in the environment"),
    sysvar!("$jitterbit.agent.id", "Environment", Informational, String, None, "Identifier of the agent running the operation"),
    sysvar!("$jitterbit.agent.group_name", "Environment", Informational, String, None, "Agent group the agent belongs to"),
    sysvar!("$jitterbit.agent.version", "Environment", Informational, String, None, "Version of the agent software"),
    sysvar!("$jitterbit.agent.os", "Environment", Informational, String, None, "Operating system of the agent"),
    sysvar!("$jitterbit.agent.is_cloud", "Environment", Informational, Boolean, None, "Whether the agent is hosted"),
    sysvar!("$jitterbit.project.name", "Environment", Informational, String, None, "Name of the deployed project"),
    sysvar!("$jitterbit.project.version", "Environment", Informational, String, None, "Deployed version of the project"),
    sysvar!("$jitterbit.user.name", "Environment", Informational, String, None, "User who deployed the project"),
    // Text
    sysvar!("$jitterbit.text.csv.load_null_values", "Text", Settings, Boolean, Some("false"), "Read empty CSV fields as null"),
    sysvar!("$jitterbit.text.qualifier", "Text", Settings, String, Some("\""), "Qualifier around delimited text fields"),
    sysvar!("$jitterbit.text.csv.write_header", "Text", Settings, Boolean, Some("true"), "Write a header row to CSV targets"),
    sysvar!("$jitterbit.text.line_ending", "Text", Settings, String, None, "Line ending written to text targets"),
    // Transformation
    sysvar!("$jitterbit.transformation.name", "Transformation", Informational, String, None, "Name of the running transformation"),
    sysvar!("$jitterbit.transformation.chunk_number", "Transformation", Informational, Integer, None, "Number of the chunk being transformed"),
    sysvar!("$jitterbit.transformation.total_chunks", "Transformation", Informational, Integer, None, "Number of chunks in this run"),
    sysvar!("$jitterbit.transformation.chunk_size", "Transformation", Settings, Integer, Some("0"), "Records per chunk, 0 to disable chunking"),
    sysvar!("$jitterbit.transformation.chunk_node_name", "Transformation", Settings, String, None, "Source node the input is chunked on"),
    sysvar!("$jitterbit.transformation.thread_count", "Transformation", Settings, Integer, Some("1"), "Threads transforming chunks in parallel"),
    sysvar!("$jitterbit.transformation.auto_clear_nodes", "Transformation", Settings, Boolean, Some("true"), "Release processed nodes during the transformation"),
    sysvar!("$jitterbit.transformation.source_record_count", "Transformation", Informational, Integer, None, "Records read from the source"),
    // NetSuite
    sysvar!("$jitterbit.netsuite.async", "NetSuite", Settings, Boolean, Some("false"), "Send NetSuite requests asynchronously"),
    sysvar!("$jitterbit.netsuite.ignore_readonly_fields", "NetSuite", Settings, Boolean, Some("false"), "Drop read-only fields from NetSuite writes"),
    sysvar!("$jitterbit.netsuite.treat_warning_as_error", "NetSuite", Settings, Boolean, Some("false"), "Fail NetSuite writes that return warnings"),
    sysvar!("$jitterbit.netsuite.page_size", "NetSuite", Settings, Integer, Some("1000"), "Records per NetSuite search page"),
    sysvar!("$jitterbit.netsuite.session_id", "NetSuite", Informational, String, None, "Session of the last NetSuite login"),
    // Salesforce
    sysvar!("$jitterbit.sfdc.session_id", "Salesforce", Informational, String, None, "Session of the last Salesforce login"),
    sysvar!("$jitterbit.sfdc.server_url", "Salesforce", Informational, String, None, "Server URL of the last Salesforce login"),
    sysvar!("$jitterbit.sfdc.batch_size", "Salesforce", Settings, Integer, Some("200"), "Records per Salesforce API call"),
    sysvar!("$jitterbit.sfdc.use_bulk_api", "Salesforce", Settings, Boolean, Some("false"), "Write to Salesforce through the bulk API"),
    sysvar!("$jitterbit.sfdc.assignment_rule_id", "Salesforce", Settings, String, None, "Assignment rule applied to Salesforce writes"),
    sysvar!("$jitterbit.sfdc.query_all", "Salesforce", Settings, Boolean, Some("false"), "Include deleted records in Salesforce queries"),
    // Email
    sysvar!("$jitterbit.email.smtp_server", "Email", Settings, String, None, "SMTP server used by SendEmail"),
    sysvar!("$jitterbit.email.smtp_port", "Email", Settings, Integer, Some("25"), "SMTP port used by SendEmail"),
    sysvar!("$jitterbit.email.use_tls", "Email", Settings, Boolean, Some("false"), "Send email over TLS"),
    sysvar!("$jitterbit.email.last_error", "Email", Informational, String, None, "Error of the last failed SendEmail"),
];

static EXTENDABLE: &[SystemVariable] = &[
    sysvar!("$jitterbit.api.request.headers", "API", Informational, String, None, "Header of the API request; append the header name"),
    sysvar!("$jitterbit.api.request.parameters", "API", Informational, String, None, "Query parameter of the API request; append the parameter name"),
    sysvar!("$jitterbit.api.request.mvparam", "API", Informational, Array, None, "Multi-valued query parameter; append the parameter name"),
    sysvar!("$jitterbit.api.response.headers", "API", Settings, String, None, "Header to return to the API caller; append the header name"),
    sysvar!("$jitterbit.source.http.request_headers", "Source", Informational, String, None, "Header received by an HTTP source; append the header name"),
    sysvar!("$jitterbit.target.http.response.header", "Target", Informational, String, None, "Header returned to an HTTP target; append the header name"),
    sysvar!("$jitterbit.target.http.request.header", "Target", Settings, String, None, "Header to send from an HTTP target; append the header name"),
    sysvar!("$jitterbit.web_service_call.request.header", "Web Service", Settings, String, None, "Header to send with web service calls; append the header name"),
    sysvar!("$jitterbit.web_service_call.response.header", "Web Service", Informational, String, None, "Header of the last web service response; append the header name"),
    sysvar!("$jitterbit.netsuite.preferences", "NetSuite", Settings, Boolean, None, "NetSuite request preference; append the preference name"),
];

lazy_static::lazy_static! {
    static ref BY_NAME: HashMap<&'static str, &'static SystemVariable> = FIXED
        .iter()
        .map(|var| (var.name.as_ref(), var))
        .collect();
}

/// True for names in the reserved `$jitterbit.` namespace
pub fn is_system_name(name: &str) -> bool {
    name.starts_with("$jitterbit.")
}

/// Exact match against the fixed catalog, then the longest extendable prefix
/// followed by `.` and a non-empty suffix.
pub fn lookup(name: &str) -> Option<SystemVariable> {
    if let Some(var) = BY_NAME.get(name) {
        return Some((*var).clone());
    }
    EXTENDABLE
        .iter()
        .filter(|var| {
            name.strip_prefix(var.name.as_ref())
                .and_then(|rest| rest.strip_prefix('.'))
                .map_or(false, |suffix| !suffix.is_empty())
        })
        .max_by_key(|var| var.name.len())
        .map(|var| SystemVariable {
            name: Cow::Owned(name.to_string()),
            ..var.clone()
        })
}

/// All fixed entries followed by the extendable prefixes
pub fn all() -> impl Iterator<Item = &'static SystemVariable> {
    FIXED.iter().chain(EXTENDABLE.iter())
}
