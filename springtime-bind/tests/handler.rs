#[cfg(feature = "derive")]
mod handler_test {
    use springtime_bind::bindable::Bindable;
    use springtime_bind::binder::Binder;
    use springtime_bind::context::BindContext;
    use springtime_bind::descriptor::BoundValue;
    use springtime_bind::error::BindError;
    use springtime_bind::handler::{
        BindHandler, IgnoreErrorsBindHandler, IgnoreTopLevelConverterNotFoundBindHandler,
        NoUnboundElementsBindHandler, TracingBindHandler,
    };
    use springtime_bind::name::ConfigurationPropertyName;
    use springtime_bind::ptr::SharedPtr;
    use springtime_bind::source::map::MapConfigurationPropertySource;
    use springtime_bind::source::PropertySourcePtr;
    use springtime_bind::Bind;
    use std::sync::Mutex;

    #[derive(Bind, PartialEq, Debug)]
    struct Database {
        url: String,
        #[bind(default)]
        pool_size: u32,
        #[bind(default)]
        replicas: Vec<String>,
    }

    #[derive(Default)]
    struct RecordingBindHandler {
        events: Mutex<Vec<String>>,
    }

    impl RecordingBindHandler {
        fn record(&self, event: &str, name: &ConfigurationPropertyName, context: &dyn BindContext) {
            if let Ok(mut events) = self.events.lock() {
                events.push(format!("{event} {name} {}", context.depth()));
            }
        }

        fn events(&self) -> Vec<String> {
            self.events
                .lock()
                .map(|events| events.clone())
                .unwrap_or_default()
        }
    }

    impl BindHandler for RecordingBindHandler {
        fn on_start(
            &self,
            name: &ConfigurationPropertyName,
            target: Bindable,
            context: &dyn BindContext,
        ) -> Result<Option<Bindable>, BindError> {
            self.record("start", name, context);
            Ok(Some(target))
        }

        fn on_success(
            &self,
            name: &ConfigurationPropertyName,
            _target: &Bindable,
            context: &dyn BindContext,
            result: BoundValue,
        ) -> Result<BoundValue, BindError> {
            self.record("success", name, context);
            Ok(result)
        }

        fn on_finish(
            &self,
            name: &ConfigurationPropertyName,
            _target: &Bindable,
            context: &dyn BindContext,
            _result: Option<&BoundValue>,
        ) -> Result<(), BindError> {
            self.record("finish", name, context);
            Ok(())
        }
    }

    fn binder(properties: &[(&str, &str)]) -> Binder {
        let source: MapConfigurationPropertySource = properties.iter().copied().collect();
        Binder::new(vec![SharedPtr::new(source) as PropertySourcePtr])
    }

    fn name(name: &str) -> ConfigurationPropertyName {
        ConfigurationPropertyName::of(name).unwrap()
    }

    #[test]
    fn should_call_hooks_for_every_name() {
        let binder = binder(&[("db.url", "postgres://"), ("db.replicas", "a")]);
        let handler = RecordingBindHandler::default();

        binder
            .bind_with::<Database>(&name("db"), Bindable::of::<Database>(), Some(&handler))
            .unwrap()
            .get()
            .unwrap();

        assert_eq!(
            handler.events(),
            [
                "start db 0",
                "start db.url 1",
                "success db.url 1",
                "finish db.url 1",
                "start db.pool-size 1",
                "finish db.pool-size 1",
                "start db.replicas 1",
                "success db.replicas 1",
                "finish db.replicas 1",
                "success db 0",
                "finish db 0",
            ]
        );
    }

    #[test]
    fn should_skip_binding_when_start_returns_none() {
        struct SkippingBindHandler;

        impl BindHandler for SkippingBindHandler {
            fn on_start(
                &self,
                _name: &ConfigurationPropertyName,
                _target: Bindable,
                _context: &dyn BindContext,
            ) -> Result<Option<Bindable>, BindError> {
                Ok(None)
            }
        }

        let binder = binder(&[("db.url", "postgres://")]);
        let result = binder
            .bind_with::<Database>(&name("db"), Bindable::of::<Database>(), Some(&SkippingBindHandler))
            .unwrap();

        assert!(!result.is_bound());
    }

    #[test]
    fn should_ignore_errors() {
        let binder = binder(&[("port", "invalid"), ("db.url", "x"), ("db.pool-size", "-1")]);
        let handler = IgnoreErrorsBindHandler::new();

        let result = binder
            .bind_with::<u16>(&name("port"), Bindable::of::<u16>(), Some(&handler))
            .unwrap();
        assert!(!result.is_bound());

        let result = binder
            .bind_with::<u16>(
                &name("port"),
                Bindable::of::<u16>().with_existing_value(8080u16),
                Some(&handler),
            )
            .unwrap();
        assert_eq!(result.get().unwrap(), 8080);

        let database = binder
            .bind_with::<Database>(&name("db"), Bindable::of::<Database>(), Some(&handler))
            .unwrap()
            .get()
            .unwrap();
        assert_eq!(database.pool_size, 0);
    }

    #[test]
    fn should_ignore_top_level_converter_not_found() {
        let binder = binder(&[("db", "postgres://")]);

        assert!(matches!(
            binder.bind::<Database>("db").unwrap_err().root_cause(),
            BindError::Conversion(error) if error.is_converter_not_found()
        ));

        let handler = IgnoreTopLevelConverterNotFoundBindHandler::new();
        let result = binder
            .bind_with::<Database>(&name("db"), Bindable::of::<Database>(), Some(&handler))
            .unwrap();
        assert!(!result.is_bound());
    }

    #[test]
    fn should_report_unbound_elements() {
        let binder = binder(&[
            ("db.url", "x"),
            ("db.replicas[0]", "a"),
            ("db.replicas[1]", "b"),
            ("db.pool-sizes", "10"),
        ]);
        let handler = NoUnboundElementsBindHandler::new();

        let error = binder
            .bind_with::<Database>(&name("db"), Bindable::of::<Database>(), Some(&handler))
            .unwrap_err();

        let BindError::UnboundProperties(properties) = error.root_cause() else {
            panic!("Unexpected error: {error:?}");
        };
        assert_eq!(properties.len(), 1);
        assert_eq!(properties[0].name().to_string(), "db.pool-sizes");
    }

    #[test]
    fn should_accept_fully_bound_properties() {
        let binder = binder(&[("db.url", "x"), ("db.replicas[0]", "a")]);
        let handler = NoUnboundElementsBindHandler::with_parent(SharedPtr::new(
            TracingBindHandler::new(),
        ));

        let database = binder
            .bind_with::<Database>(&name("db"), Bindable::of::<Database>(), Some(&handler))
            .unwrap()
            .get()
            .unwrap();
        assert_eq!(database.replicas, ["a"]);
    }
}
