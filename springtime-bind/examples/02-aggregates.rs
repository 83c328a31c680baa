use springtime_bind::binder::Binder;
use springtime_bind::ptr::SharedPtr;
use springtime_bind::source::map::MapConfigurationPropertySource;
use springtime_bind::source::PropertySourcePtr;
use springtime_bind::Bind;
use std::collections::BTreeMap;

#[derive(Bind, Debug)]
struct Upstream {
    name: String,
    weight: u8,
}

#[derive(Bind, Debug)]
struct ProxyProperties {
    // a single comma-separated value or indexed properties can be bound into collections
    hosts: Vec<String>,
    // indexed properties can also contain whole objects
    upstreams: Vec<Upstream>,
    // map keys are the first element below the map name
    headers: BTreeMap<String, String>,
    // arrays are bound from exactly as many elements as they hold
    ratio: [u8; 2],
}

//noinspection DuplicatedCode
// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    let source = MapConfigurationPropertySource::new()
        .with("proxy.hosts", "a.com, b.com")
        .with("proxy.upstreams[0].name", "primary")
        .with("proxy.upstreams[0].weight", "10")
        .with("proxy.upstreams[1].name", "backup")
        .with("proxy.upstreams[1].weight", "1")
        .with("proxy.headers.accept", "*/*")
        .with("proxy.headers.user-agent", "proxy for ${proxy.upstreams[0].name}")
        .with("proxy.ratio", "3,1");

    // placeholders are resolved against the sources of the binder
    let binder = Binder::builder()
        .with_source(SharedPtr::new(source) as PropertySourcePtr)
        .with_source_placeholders()
        .build();

    let proxy = binder
        .bind::<ProxyProperties>("proxy")
        .expect("error binding ProxyProperties")
        .get()
        .expect("no proxy properties found");

    println!("hosts: {:?}", proxy.hosts);
    for upstream in &proxy.upstreams {
        println!("upstream {} with weight {}", upstream.name, upstream.weight);
    }

    for (name, value) in &proxy.headers {
        println!("header {name}: {value}");
    }

    println!("ratio: {:?}", proxy.ratio);
}
