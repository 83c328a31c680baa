#[cfg(feature = "derive")]
mod binder_test {
    use springtime_bind::bindable::{BindMethod, BindRestriction, Bindable};
    use springtime_bind::binder::Binder;
    use springtime_bind::error::{BindError, PlaceholderError};
    use springtime_bind::name::ConfigurationPropertyName;
    use springtime_bind::property::PropertyValue;
    use springtime_bind::ptr::SharedPtr;
    use springtime_bind::source::map::MapConfigurationPropertySource;
    use springtime_bind::source::PropertySourcePtr;
    use springtime_bind::{converter, Bind};
    use std::collections::{BTreeMap, HashMap};
    use std::time::Duration;

    #[derive(Bind, PartialEq, Debug)]
    struct Server {
        port: u16,
        #[bind(default = "default_host")]
        host: String,
        #[bind(default)]
        timeout: Option<Duration>,
    }

    fn default_host() -> String {
        "localhost".to_string()
    }

    #[derive(Bind, PartialEq, Debug)]
    struct Application {
        name: String,
        server: Option<Server>,
        #[bind(default)]
        tags: Vec<String>,
        #[bind(default)]
        mode: Mode,
    }

    #[derive(Bind, Default, Clone, PartialEq, Debug)]
    #[bind(bean)]
    struct Pool {
        max_size: u32,
        name: String,
        #[bind(ignore)]
        generation: u64,
    }

    #[derive(Bind, Default, Clone, Copy, PartialEq, Debug)]
    enum Mode {
        #[default]
        Fast,
        SafeAndSlow,
        #[bind(name = "legacy")]
        Compatible,
    }

    #[derive(Bind, PartialEq, Debug)]
    struct Node {
        value: i32,
        child: Option<Box<Node>>,
    }

    #[derive(PartialEq, Debug)]
    struct Rgb(u8, u8, u8);

    impl springtime_bind::descriptor::Bind for Rgb {
        fn type_descriptor() -> springtime_bind::descriptor::TypeDescriptor {
            springtime_bind::descriptor::TypeDescriptor::scalar::<Self>(|_| {
                Err(springtime_bind::descriptor::ScalarParseError::Unsupported)
            })
        }
    }

    #[converter]
    fn parse_rgb(value: &str) -> Result<Rgb, String> {
        let value = value.strip_prefix('#').ok_or("missing #")?;
        let channel = |index: usize| {
            u8::from_str_radix(&value[index..index + 2], 16).map_err(|error| error.to_string())
        };

        Ok(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    fn source(properties: &[(&str, &str)]) -> PropertySourcePtr {
        let source: MapConfigurationPropertySource = properties.iter().copied().collect();
        SharedPtr::new(source)
    }

    fn binder(properties: &[(&str, &str)]) -> Binder {
        Binder::new(vec![source(properties)])
    }

    #[test]
    fn should_bind_value_object() {
        let binder = binder(&[
            ("app.name", "demo"),
            ("app.server.port", "8080"),
            ("app.server.timeout", "5s"),
            ("app.tags", "a, b"),
            ("app.mode", "SAFE_AND_SLOW"),
        ]);

        assert_eq!(
            binder.bind::<Application>("app").unwrap().get().unwrap(),
            Application {
                name: "demo".to_string(),
                server: Some(Server {
                    port: 8080,
                    host: "localhost".to_string(),
                    timeout: Some(Duration::from_secs(5)),
                }),
                tags: vec!["a".to_string(), "b".to_string()],
                mode: Mode::SafeAndSlow,
            }
        );
    }

    #[test]
    fn should_apply_defaults_for_missing_properties() {
        let binder = binder(&[("app.name", "demo"), ("app.mode", "legacy")]);

        assert_eq!(
            binder.bind::<Application>("app").unwrap().get().unwrap(),
            Application {
                name: "demo".to_string(),
                server: None,
                tags: vec![],
                mode: Mode::Compatible,
            }
        );
    }

    #[test]
    fn should_not_bind_without_properties() {
        let binder = binder(&[("other.name", "demo")]);
        assert!(!binder.bind::<Application>("app").unwrap().is_bound());
        assert!(!binder.bind::<u16>("app.port").unwrap().is_bound());
    }

    #[test]
    fn should_bind_leniently_named_properties() {
        let binder = binder(&[("POOL.MAX_SIZE", "10"), ("pool.name", "main")]);

        assert_eq!(
            binder.bind::<Pool>("pool").unwrap().get().unwrap(),
            Pool {
                max_size: 10,
                name: "main".to_string(),
                generation: 0,
            }
        );
    }

    #[test]
    fn should_bind_into_existing_bean() {
        let binder = binder(&[("pool.max-size", "10")]);
        let existing = Pool {
            max_size: 1,
            name: "existing".to_string(),
            generation: 7,
        };

        let result = binder
            .bind_with::<Pool>(
                &ConfigurationPropertyName::of("pool").unwrap(),
                Bindable::of::<Pool>().with_existing_value(existing),
                None,
            )
            .unwrap()
            .get()
            .unwrap();

        assert_eq!(
            result,
            Pool {
                max_size: 10,
                name: "existing".to_string(),
                generation: 7,
            }
        );
    }

    #[test]
    fn should_keep_existing_value_when_nothing_bound() {
        let binder = binder(&[]);
        let target = Bindable::of::<Pool>().with_existing_value(Pool::default());

        let result = binder
            .bind_with::<Pool>(
                &ConfigurationPropertyName::of("pool").unwrap(),
                target.clone(),
                None,
            )
            .unwrap();

        assert!(!result.is_bound());
        assert!(target.has_value());
    }

    #[test]
    fn should_respect_bind_method() {
        let binder = binder(&[("server.port", "80")]);
        let result = binder
            .bind_with::<Server>(
                &ConfigurationPropertyName::of("server").unwrap(),
                Bindable::of::<Server>().with_bind_method(Some(BindMethod::Bean)),
                None,
            )
            .unwrap();

        assert!(!result.is_bound());
    }

    #[test]
    fn should_bind_or_create() {
        let binder = binder(&[]);

        assert_eq!(binder.bind_or_create::<Pool>("pool").unwrap(), Pool::default());
        assert!(binder.bind_or_create::<Vec<u8>>("list").unwrap().is_empty());
        assert_eq!(binder.bind_or_create::<Option<u8>>("value").unwrap(), None);

        let error = binder.bind_or_create::<Server>("server").unwrap_err();
        assert!(matches!(
            error.root_cause(),
            BindError::UnableToCreateInstance(_)
        ));
    }

    #[test]
    fn should_bind_indexed_collections() {
        let binder = binder(&[
            ("servers[0].port", "1"),
            ("servers[1].port", "2"),
            ("servers[1].host", "remote"),
            ("ports[1]", "20"),
            ("ports[0]", "10"),
            ("ports[3]", "30"),
            ("sparse[0]", "1"),
            ("sparse[7]", "70"),
            ("sparse[5]", "50"),
            ("sparse[3]", "30"),
        ]);

        let servers = binder.bind::<Vec<Server>>("servers").unwrap().get().unwrap();
        assert_eq!(servers.len(), 2);
        assert_eq!(servers[0].port, 1);
        assert_eq!(servers[1].host, "remote");

        assert_eq!(
            binder.bind::<Vec<u16>>("ports").unwrap().get().unwrap(),
            vec![10, 20, 30]
        );

        // indexes after a gap are bound in ascending order
        assert_eq!(
            binder.bind::<Vec<u16>>("sparse").unwrap().get().unwrap(),
            vec![1, 30, 50, 70]
        );
    }

    #[test]
    fn should_skip_direct_property_when_restricted() {
        let binder = binder(&[("list", "a,b"), ("list[0]", "z"), ("flat", "a,b")]);
        let list_name = ConfigurationPropertyName::of("list").unwrap();
        let flat_name = ConfigurationPropertyName::of("flat").unwrap();
        let restricted = || {
            Bindable::of::<Vec<String>>()
                .with_bind_restrictions([BindRestriction::NoDirectProperty])
        };

        let list = binder
            .bind_with::<Vec<String>>(&list_name, restricted(), None)
            .unwrap()
            .get()
            .unwrap();
        assert_eq!(list, vec!["z"]);

        assert!(!binder
            .bind_with::<Vec<String>>(&flat_name, restricted(), None)
            .unwrap()
            .is_bound());
        assert!(!binder
            .bind_with::<HashMap<String, String>>(
                &flat_name,
                Bindable::of::<HashMap<String, String>>()
                    .with_bind_restrictions([BindRestriction::NoDirectProperty]),
                None
            )
            .unwrap()
            .is_bound());
        assert_eq!(
            binder.bind::<Vec<String>>("list").unwrap().get().unwrap(),
            vec!["a", "b"]
        );
    }

    #[test]
    fn should_bind_native_sequences() {
        let mut source = MapConfigurationPropertySource::new();
        source.put("list", vec![1, 2, 3]);
        source.put("empty", "");
        let binder = Binder::new(vec![SharedPtr::new(source) as PropertySourcePtr]);

        assert_eq!(
            binder.bind::<[i64; 3]>("list").unwrap().get().unwrap(),
            [1, 2, 3]
        );
        assert!(binder
            .bind::<Vec<String>>("empty")
            .unwrap()
            .get()
            .unwrap()
            .is_empty());
        assert!(matches!(
            binder.bind::<[i64; 2]>("list").unwrap_err().root_cause(),
            BindError::ArrayLength {
                expected: 2,
                actual: 3,
                ..
            }
        ));
    }

    #[test]
    fn should_bind_maps() {
        let binder = binder(&[
            ("servers.alpha.port", "1"),
            ("servers.beta.port", "2"),
            ("labels.team", "core"),
            ("labels.cost.center", "42"),
            ("limits[first]", "1"),
            ("limits[second]", "2"),
        ]);

        let servers = binder
            .bind::<HashMap<String, Server>>("servers")
            .unwrap()
            .get()
            .unwrap();
        assert_eq!(servers.len(), 2);
        assert_eq!(servers["alpha"].port, 1);
        assert_eq!(servers["beta"].port, 2);

        let labels = binder
            .bind::<BTreeMap<String, String>>("labels")
            .unwrap()
            .get()
            .unwrap();
        assert_eq!(labels["team"], "core");
        assert_eq!(labels["cost.center"], "42");

        let limits = binder
            .bind::<HashMap<String, u8>>("limits")
            .unwrap()
            .get()
            .unwrap();
        assert_eq!(limits["first"], 1);
        assert_eq!(limits["second"], 2);
    }

    #[test]
    fn should_merge_maps_with_first_source_winning() {
        let binder = Binder::new(vec![
            source(&[("labels.a", "first")]),
            source(&[("labels.a", "second"), ("labels.b", "second")]),
        ]);

        let labels = binder
            .bind::<HashMap<String, String>>("labels")
            .unwrap()
            .get()
            .unwrap();
        assert_eq!(labels["a"], "first");
        assert_eq!(labels["b"], "second");
    }

    #[test]
    fn should_bind_typed_map_keys() {
        let binder = binder(&[("weights.1", "0.5"), ("weights.2", "1.5")]);

        let weights = binder
            .bind::<BTreeMap<u8, f64>>("weights")
            .unwrap()
            .get()
            .unwrap();
        assert_eq!(weights.keys().copied().collect::<Vec<u8>>(), vec![1, 2]);
        assert_eq!(weights[&2], 1.5);
    }

    #[test]
    fn should_not_bind_recursive_data_objects() {
        let binder = binder(&[("node.value", "1"), ("node.child.value", "2")]);

        assert_eq!(
            binder.bind::<Node>("node").unwrap().get().unwrap(),
            Node {
                value: 1,
                child: None
            }
        );
    }

    #[test]
    fn should_resolve_placeholders() {
        let binder = Binder::builder()
            .with_source(source(&[
                ("server.port", "${port:9090}"),
                ("server.host", "${host}"),
                ("host", "example.com"),
            ]))
            .with_source_placeholders()
            .build();

        let server = binder.bind::<Server>("server").unwrap().get().unwrap();
        assert_eq!(server.port, 9090);
        assert_eq!(server.host, "example.com");

        let binder = Binder::builder()
            .with_source(source(&[("server.port", "${missing}")]))
            .with_source_placeholders()
            .build();

        assert!(matches!(
            binder.bind::<Server>("server").unwrap_err().root_cause(),
            BindError::Placeholder(PlaceholderError::Unresolvable { .. })
        ));
    }

    #[test]
    fn should_use_registered_converters() {
        let binder = binder(&[("color", "#ff8000")]);
        assert_eq!(
            binder.bind::<Rgb>("color").unwrap().get().unwrap(),
            Rgb(255, 128, 0)
        );
    }

    #[test]
    fn should_bind_raw_property_values() {
        let binder = binder(&[("raw", "text")]);
        assert_eq!(
            binder.bind::<PropertyValue>("raw").unwrap().get().unwrap(),
            PropertyValue::from("text")
        );
    }

    #[test]
    fn should_bind_with_root_name() {
        let binder = binder(&[("port", "1"), ("host", "h")]);
        let server = binder.bind::<Server>("").unwrap().get().unwrap();

        assert_eq!(server.port, 1);
        assert_eq!(server.host, "h");
    }
}
