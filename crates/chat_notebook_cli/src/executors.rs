use std::time::Duration;

use agent_session::ExecutorFactory;
use chat_notebook::EnvConfig;
use code_executor::{ProcessConfig, ProcessExecutorFactory, PROCESS_EXECUTOR_ID};
use executor_mock::{MockExecutorFactory, MOCK_EXECUTOR_ID};

pub const DEFAULT_EXECUTOR_ID: &str = PROCESS_EXECUTOR_ID;

pub fn factory_from_env(config: &EnvConfig) -> Result<Box<dyn ExecutorFactory>, String> {
    factory_for_id(
        config.executor.as_deref().unwrap_or(DEFAULT_EXECUTOR_ID),
        config,
    )
}

pub fn factory_for_id(
    executor_id: &str,
    config: &EnvConfig,
) -> Result<Box<dyn ExecutorFactory>, String> {
    match executor_id {
        PROCESS_EXECUTOR_ID => Ok(Box::new(ProcessExecutorFactory::new(process_config(
            config,
        )))),
        MOCK_EXECUTOR_ID => Ok(Box::new(MockExecutorFactory::default())),
        unknown => Err(format!(
            "Unsupported executor '{unknown}'. Available executors: {PROCESS_EXECUTOR_ID}, {MOCK_EXECUTOR_ID}"
        )),
    }
}

/// Process settings with environment overrides applied over the defaults.
pub fn process_config(config: &EnvConfig) -> ProcessConfig {
    let mut process = ProcessConfig::default();
    if let Some(program) = &config.shell_program {
        process.shell_program = program.clone();
    }
    if let Some(program) = &config.python_program {
        process.python_program = program.clone();
    }
    if let Some(seconds) = config.exec_timeout_sec {
        process.timeout = Duration::from_secs(seconds);
    }
    process
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use agent_session::{ExecStep, ExecutorKind};
    use chat_notebook::EnvConfig;
    use code_executor::ProcessConfig;

    use super::{factory_for_id, factory_from_env, process_config};

    #[test]
    fn defaults_apply_without_overrides() {
        assert_eq!(
            process_config(&EnvConfig::default()),
            ProcessConfig::default()
        );
    }

    #[test]
    fn env_overrides_replace_programs_and_timeout() {
        let config = EnvConfig {
            shell_program: Some("sh".to_string()),
            python_program: Some("python3.12".to_string()),
            exec_timeout_sec: Some(7),
            ..EnvConfig::default()
        };

        let process = process_config(&config);
        assert_eq!(process.shell_program, "sh");
        assert_eq!(process.python_program, "python3.12");
        assert_eq!(process.timeout, Duration::from_secs(7));
        assert_eq!(
            process.max_output_bytes,
            ProcessConfig::default().max_output_bytes
        );
    }

    #[test]
    fn mock_backend_echoes_code() {
        let config = EnvConfig {
            executor: Some("mock".to_string()),
            ..EnvConfig::default()
        };
        let factory = factory_from_env(&config).expect("mock backend resolves");
        let mut executor = factory.create(ExecutorKind::Shell).expect("create");

        let steps: Vec<ExecStep> = executor.run("ls").expect("run").collect();
        assert_eq!(steps, vec![ExecStep::Output("ls\n".to_string())]);
    }

    #[test]
    fn process_backend_resolves_without_spawning() {
        let factory = factory_for_id("process", &EnvConfig::default()).expect("process backend");
        let executor = factory.create(ExecutorKind::Python).expect("create");

        assert_eq!(executor.kind(), ExecutorKind::Python);
        assert!(!executor.is_running());
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let error = match factory_for_id("remote", &EnvConfig::default()) {
            Ok(_) => panic!("unknown executors should fail"),
            Err(error) => error,
        };

        assert!(error.contains("Unsupported executor 'remote'"));
    }
}
