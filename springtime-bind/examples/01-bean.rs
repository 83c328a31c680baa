use springtime_bind::bindable::Bindable;
use springtime_bind::binder::Binder;
use springtime_bind::name::ConfigurationPropertyName;
use springtime_bind::ptr::SharedPtr;
use springtime_bind::source::map::MapConfigurationPropertySource;
use springtime_bind::source::PropertySourcePtr;
use springtime_bind::Bind;

// beans are created with Default::default() and then have each bound property set individually
#[derive(Bind, Default, Debug)]
#[bind(bean)]
struct PoolProperties {
    max_size: u32,
    name: String,
    // ignored fields are never bound and keep their current value
    #[bind(ignore)]
    generation: u64,
}

//noinspection DuplicatedCode
// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    let source = MapConfigurationPropertySource::new().with("pool.max-size", "10");
    let binder = Binder::new(vec![SharedPtr::new(source) as PropertySourcePtr]);

    // only properties which are present are set - the rest keep their defaults
    let pool = binder
        .bind::<PoolProperties>("pool")
        .expect("error binding PoolProperties")
        .get()
        .expect("no pool properties found");

    // prints "PoolProperties { max_size: 10, name: "", generation: 0 }"
    println!("{pool:?}");

    // beans can also be bound into an existing instance
    let existing = PoolProperties {
        max_size: 1,
        name: "main".to_string(),
        generation: 7,
    };

    let pool = binder
        .bind_with::<PoolProperties>(
            &ConfigurationPropertyName::of("pool").expect("invalid name"),
            Bindable::of::<PoolProperties>().with_existing_value(existing),
            None,
        )
        .expect("error binding PoolProperties")
        .get()
        .expect("no pool properties found");

    // prints "PoolProperties { max_size: 10, name: "main", generation: 7 }"
    println!("{pool:?}");

    // when there is nothing to bind, a default instance can be created instead
    let other = binder
        .bind_or_create::<PoolProperties>("other")
        .expect("error creating PoolProperties");

    // prints "PoolProperties { max_size: 0, name: "", generation: 0 }"
    println!("{other:?}");
}
