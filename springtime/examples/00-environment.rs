use config::FileFormat;
use springtime::application::Application;
use springtime::environment::Environment;
use springtime::source::{ConfigFilePropertySource, SystemEnvironmentPropertySource};
use springtime_bind::ptr::SharedPtr;
use springtime_bind::source::map::MapConfigurationPropertySource;
use springtime_bind::source::PropertySourcePtr;
use springtime_bind::Bind;

#[derive(Bind, Debug)]
struct DatabaseProperties {
    url: String,
    #[bind(default)]
    pool_size: u8,
    #[bind(default)]
    replicas: Vec<String>,
}

// this would normally live in a file passed to EnvironmentBuilder::with_config_file()
const CONFIG: &str = r#"
[database]
url = "postgres://${database.host:localhost}/app"
replicas = ["replica-1", "replica-2"]
"#;

//noinspection DuplicatedCode
// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    let config_file = ConfigFilePropertySource::from_content(CONFIG, FileFormat::Toml)
        .expect("error parsing configuration");

    // sources are queried in order, so earlier ones override later ones
    let environment = Environment::builder()
        // real environment variables are replaced with a fixed set to make the output predictable
        .with_environment_variables(false)
        .with_source(SharedPtr::new(SystemEnvironmentPropertySource::from_vars([
            ("DATABASE_HOST", "db.example.com"),
            ("DATABASE_POOL_SIZE", "16"),
        ])) as PropertySourcePtr)
        .with_source(SharedPtr::new(config_file) as PropertySourcePtr)
        .with_config_file(None)
        // default properties always come last
        .with_default_properties(
            MapConfigurationPropertySource::new()
                .with("springtime.install-tracing-logger", "true")
                .with("database.pool-size", "4"),
        )
        .build()
        .expect("error creating Environment");

    // binds springtime.* configuration and installs a tracing logger
    let application = Application::new(environment).expect("error creating Application");

    let database = application
        .bind::<DatabaseProperties>("database")
        .expect("error binding DatabaseProperties")
        .get()
        .expect("no database properties found");

    // prints "postgres://db.example.com/app with 16 connections and replicas ["replica-1", "replica-2"]"
    println!(
        "{} with {} connections and replicas {:?}",
        database.url, database.pool_size, database.replicas
    );
}
