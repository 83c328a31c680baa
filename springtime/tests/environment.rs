mod environment_test {
    use springtime::application::Application;
    use springtime::environment::Environment;
    use springtime::source::SystemEnvironmentPropertySource;
    use springtime_bind::ptr::SharedPtr;
    use springtime_bind::source::map::MapConfigurationPropertySource;
    use springtime_bind::source::PropertySourcePtr;
    use springtime_bind::Bind;
    use std::fs;
    use std::path::PathBuf;
    use std::time::Duration;

    #[derive(Bind, Debug)]
    struct ServerProperties {
        host: String,
        ports: Vec<u16>,
        #[bind(default)]
        timeout: Option<Duration>,
        #[bind(default)]
        upstreams: Vec<Upstream>,
    }

    #[derive(Bind, Debug)]
    struct Upstream {
        name: String,
        weight: u8,
    }

    #[derive(Bind, Debug)]
    struct PoolProperties {
        size: u8,
    }

    #[derive(Bind, Debug)]
    struct AppProperties {
        max_pool: PoolProperties,
    }

    struct ConfigFile {
        path: PathBuf,
    }

    impl ConfigFile {
        fn create(name: &str, content: &str) -> Self {
            let path = std::env::temp_dir().join(format!("{name}-{}.toml", std::process::id()));
            fs::write(&path, content).unwrap();
            Self { path }
        }

        fn name(&self) -> String {
            self.path.to_string_lossy().into_owned()
        }
    }

    impl Drop for ConfigFile {
        fn drop(&mut self) {
            let _ = fs::remove_file(&self.path);
        }
    }

    const CONFIG: &str = r#"
[springtime]
install_tracing_logger = false

[server]
host = "${server.address:localhost}"
ports = [80, 443]

[[server.upstreams]]
name = "primary"
weight = 10

[[server.upstreams]]
name = "backup"
weight = 1
"#;

    #[test]
    fn should_bind_from_config_file() {
        let config_file = ConfigFile::create("springtime-config-file", CONFIG);
        let environment = Environment::builder()
            .with_environment_variables(false)
            .with_config_file(Some(config_file.name()))
            .build()
            .unwrap();

        let application = Application::new(environment).unwrap();
        assert!(!application.config().install_tracing_logger);

        let server = application
            .bind::<ServerProperties>("server")
            .unwrap()
            .get()
            .unwrap();
        assert_eq!(server.host, "localhost");
        assert_eq!(server.ports, [80, 443]);
        assert_eq!(server.timeout, None);
        assert_eq!(server.upstreams.len(), 2);
        assert_eq!(server.upstreams[0].name, "primary");
        assert_eq!(server.upstreams[1].weight, 1);
    }

    #[test]
    fn should_override_config_file_with_environment_variables() {
        let config_file = ConfigFile::create("springtime-env-override", CONFIG);
        let environment = Environment::builder()
            .with_environment_variables(false)
            .with_source(SharedPtr::new(SystemEnvironmentPropertySource::from_vars([
                ("SERVER_ADDRESS", "example.com"),
                ("SERVER_PORTS", "8080,8443"),
                ("SERVER_TIMEOUT", "5s"),
            ])) as PropertySourcePtr)
            .with_config_file(Some(config_file.name()))
            .build()
            .unwrap();

        let server = Application::new(environment)
            .unwrap()
            .bind::<ServerProperties>("server")
            .unwrap()
            .get()
            .unwrap();
        assert_eq!(server.host, "example.com");
        assert_eq!(server.ports, [8080, 8443]);
        assert_eq!(server.timeout, Some(Duration::from_secs(5)));
        assert_eq!(server.upstreams.len(), 2);
    }

    #[test]
    fn should_use_default_properties_last() {
        let environment = Environment::builder()
            .with_environment_variables(false)
            .with_config_file(None)
            .with_source(SharedPtr::new(
                MapConfigurationPropertySource::new().with("springtime.install-tracing-logger", "no"),
            ) as PropertySourcePtr)
            .with_default_properties(
                MapConfigurationPropertySource::new()
                    .with("server.host", "default")
                    .with("server.ports", "1"),
            )
            .build()
            .unwrap();

        let server = Application::new(environment)
            .unwrap()
            .bind::<ServerProperties>("server")
            .unwrap()
            .get()
            .unwrap();
        assert_eq!(server.host, "default");
        assert_eq!(server.ports, [1]);
        assert!(server.upstreams.is_empty());
    }

    #[test]
    fn should_bind_nested_objects_from_dashed_environment_variables() {
        let environment = Environment::builder()
            .with_environment_variables(false)
            .with_config_file(None)
            .with_source(SharedPtr::new(SystemEnvironmentPropertySource::from_vars([
                ("APP_MAX_POOL_SIZE", "5"),
            ])) as PropertySourcePtr)
            .with_default_properties(
                MapConfigurationPropertySource::new()
                    .with("springtime.install-tracing-logger", "false"),
            )
            .build()
            .unwrap();

        let app = Application::new(environment)
            .unwrap()
            .bind::<AppProperties>("app")
            .unwrap()
            .get()
            .unwrap();
        assert_eq!(app.max_pool.size, 5);
    }
}
