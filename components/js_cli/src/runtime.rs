//! Runtime orchestration for script execution
//!
//! The Runtime owns one bridge [`Context`] configured from the command
//! line, with the CLI's host modules and `print` global installed.

use crate::error::{CliError, CliResult};
use crate::stdlib;
use core_types::Value;
use js_bridge::{BridgeConfig, Context};
use log::debug;
use std::path::Path;

/// Executes scripts against a single long-lived context
pub struct Runtime {
    /// The bridge context scripts run in
    context: Context,
    /// Whether results are rendered as JSON
    json_output: bool,
}

impl Runtime {
    /// Create a runtime from a bridge configuration
    ///
    /// # Example
    /// ```
    /// use js_bridge::BridgeConfig;
    /// use js_cli::Runtime;
    ///
    /// let mut runtime = Runtime::new(&BridgeConfig::default()).unwrap();
    /// let result = runtime.execute_string("6 * 7").unwrap();
    /// assert_eq!(runtime.format_result(&result).unwrap(), Some("42".to_string()));
    /// ```
    pub fn new(config: &BridgeConfig) -> CliResult<Self> {
        let mut context = Context::from_config(config, stdlib::host_modules())?;
        context.define_global("print", stdlib::print_function())?;
        debug!("runtime ready (require: {})", config.enable_require);

        Ok(Self {
            context,
            json_output: false,
        })
    }

    /// Render results as JSON instead of JavaScript notation
    pub fn with_json_output(mut self, enabled: bool) -> Self {
        self.json_output = enabled;
        self
    }

    /// Execute a JavaScript file
    ///
    /// # Errors
    /// Returns `CliError` if the file cannot be read or execution fails
    pub fn execute_file(&mut self, path: &Path) -> CliResult<Value> {
        let source = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("executing {}", path.display());
        self.execute_string(&source)
    }

    /// Execute a JavaScript source string
    ///
    /// # Errors
    /// Returns `CliError` if evaluation fails
    pub fn execute_string(&mut self, source: &str) -> CliResult<Value> {
        Ok(self.context.eval(source)?)
    }

    /// Renders a result for printing; `None` for null results
    pub fn format_result(&self, value: &Value) -> CliResult<Option<String>> {
        if value.is_null() {
            return Ok(None);
        }
        if self.json_output {
            let json = value.to_json()?;
            return serde_json::to_string(&json)
                .map(Some)
                .map_err(|e| CliError::Output(e.to_string()));
        }
        Ok(Some(value.to_string()))
    }

    /// Names of the globals the runtime defined
    pub fn global_names(&self) -> Vec<&str> {
        self.context.globals().keys().map(String::as_str).collect()
    }

    /// Whether `require` is available to scripts
    pub fn has_require(&self) -> bool {
        self.context.resolver().is_some()
    }

    /// Start the REPL (Read-Eval-Print Loop)
    ///
    /// # Errors
    /// Returns `CliError` if the REPL encounters a fatal error
    pub fn repl(&mut self) -> CliResult<()> {
        crate::repl::run_repl(self)
    }

    /// Check if JSON output is enabled
    pub fn is_json_output(&self) -> bool {
        self.json_output
    }
}
