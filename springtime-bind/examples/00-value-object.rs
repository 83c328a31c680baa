use springtime_bind::binder::Binder;
use springtime_bind::ptr::SharedPtr;
use springtime_bind::source::map::MapConfigurationPropertySource;
use springtime_bind::source::PropertySourcePtr;
use springtime_bind::Bind;
use std::time::Duration;

fn default_host() -> String {
    "localhost".to_string()
}

// value objects are created by calling a constructor with all bound properties at once
#[derive(Bind, Debug)]
struct ServerProperties {
    port: u16,
    // fields with a default are optional - the function is called when nothing is bound
    #[bind(default = "default_host")]
    host: String,
    // Default::default() is used when no function is given
    #[bind(default)]
    timeout: Option<Duration>,
}

//noinspection DuplicatedCode
// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    // properties usually come from files or the environment, but a map is enough here
    let source = MapConfigurationPropertySource::new()
        .with("server.port", "8080")
        // names are matched leniently, so "Timeout" and "timeout" are the same property
        .with("server.Timeout", "30s");

    let binder = Binder::new(vec![SharedPtr::new(source) as PropertySourcePtr]);

    let properties = binder
        .bind::<ServerProperties>("server")
        .expect("error binding ServerProperties")
        .get()
        .expect("no server properties found");

    // prints "localhost:8080 (timeout: Some(30s))"
    println!(
        "{}:{} (timeout: {:?})",
        properties.host, properties.port, properties.timeout
    );

    // nothing under "client" means nothing is bound, which is not an error
    assert!(!binder
        .bind::<ServerProperties>("client")
        .expect("error binding ServerProperties")
        .is_bound());
}
