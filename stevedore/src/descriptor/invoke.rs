use std::{sync::Arc, vec};

use crate::{
    any::{unerase, Instance, TypeInfo},
    errors::InvokeErrorKind,
};

/// A function building `T` from shared dependencies.
///
/// Implemented for every `Fn(Arc<A1>, .., Arc<An>) -> T`, up to twelve parameters.
pub trait Constructor<T, Args>: Clone + Send + Sync + 'static {
    fn parameter_types() -> Vec<TypeInfo>;

    fn construct(&self, arguments: Vec<Instance>) -> Result<T, InvokeErrorKind>;
}

/// A method called on `&mut T` with shared dependencies.
///
/// Implemented for every `Fn(&mut T, Arc<A1>, .., Arc<An>)`, up to twelve parameters.
pub trait Method<T, Args>: Clone + Send + Sync + 'static {
    fn parameter_types() -> Vec<TypeInfo>;

    fn invoke(&self, target: &mut T, arguments: Vec<Instance>) -> Result<(), InvokeErrorKind>;
}

pub(crate) struct Arguments {
    inner: vec::IntoIter<Instance>,
    position: usize,
    expected: usize,
}

impl Arguments {
    pub(crate) fn new(arguments: Vec<Instance>, expected: usize) -> Result<Self, InvokeErrorKind> {
        if arguments.len() != expected {
            return Err(InvokeErrorKind::ArgumentCount {
                expected,
                actual: arguments.len(),
            });
        }

        Ok(Self {
            inner: arguments.into_iter(),
            position: 0,
            expected,
        })
    }

    pub(crate) fn next<A>(&mut self) -> Result<Arc<A>, InvokeErrorKind>
    where
        A: ?Sized + Send + Sync + 'static,
    {
        let position = self.position;
        let Some(argument) = self.inner.next() else {
            return Err(InvokeErrorKind::ArgumentCount {
                expected: self.expected,
                actual: position,
            });
        };
        self.position += 1;

        unerase::<A>(&argument).ok_or(InvokeErrorKind::IncorrectArgument {
            position,
            expected: TypeInfo::of::<A>(),
        })
    }
}

macro_rules! impl_constructor {
    ([$($ty:ident),*]) => {
        #[allow(non_snake_case, unused_mut, unused_variables)]
        impl<F, T, $($ty,)*> Constructor<T, ($(Arc<$ty>,)*)> for F
        where
            F: Fn($(Arc<$ty>),*) -> T + Clone + Send + Sync + 'static,
            $($ty: ?Sized + Send + Sync + 'static,)*
        {
            #[inline]
            fn parameter_types() -> Vec<TypeInfo> {
                vec![$(TypeInfo::of::<$ty>()),*]
            }

            fn construct(&self, arguments: Vec<Instance>) -> Result<T, InvokeErrorKind> {
                let mut arguments = Arguments::new(arguments, Self::parameter_types().len())?;
                $(let $ty = arguments.next::<$ty>()?;)*
                Ok(self($($ty),*))
            }
        }
    };
}

macro_rules! impl_method {
    ([$($ty:ident),*]) => {
        #[allow(non_snake_case, unused_mut, unused_variables)]
        impl<F, T, $($ty,)*> Method<T, ($(Arc<$ty>,)*)> for F
        where
            F: Fn(&mut T, $(Arc<$ty>),*) + Clone + Send + Sync + 'static,
            $($ty: ?Sized + Send + Sync + 'static,)*
        {
            #[inline]
            fn parameter_types() -> Vec<TypeInfo> {
                vec![$(TypeInfo::of::<$ty>()),*]
            }

            fn invoke(&self, target: &mut T, arguments: Vec<Instance>) -> Result<(), InvokeErrorKind> {
                let mut arguments = Arguments::new(arguments, Self::parameter_types().len())?;
                $(let $ty = arguments.next::<$ty>()?;)*
                self(target, $($ty),*);
                Ok(())
            }
        }
    };
}

all_the_tuples!(impl_constructor);
all_the_tuples!(impl_method);

#[cfg(test)]
mod tests {
    use super::{Constructor, Method};
    use crate::{
        any::{erase, Instance, TypeInfo},
        errors::InvokeErrorKind,
    };

    use std::sync::Arc;

    trait Clock: Send + Sync {
        fn now(&self) -> u64;
    }

    struct Fixed(u64);

    impl Clock for Fixed {
        fn now(&self) -> u64 {
            self.0
        }
    }

    struct Report {
        clock: Arc<dyn Clock>,
        title: Arc<String>,
        stamped: Option<u64>,
    }

    impl Report {
        fn new(clock: Arc<dyn Clock>, title: Arc<String>) -> Self {
            Self {
                clock,
                title,
                stamped: None,
            }
        }

        fn stamp(&mut self, clock: Arc<dyn Clock>) {
            self.stamped = Some(clock.now());
        }
    }

    fn parameters<Args, F: Constructor<Report, Args>>(_: &F) -> Vec<TypeInfo> {
        F::parameter_types()
    }

    fn build<Args, F: Constructor<Report, Args>>(constructor: &F, arguments: Vec<Instance>) -> Result<Report, InvokeErrorKind> {
        constructor.construct(arguments)
    }

    fn call<Args, F: Method<Report, Args>>(method: &F, report: &mut Report, arguments: Vec<Instance>) -> Result<Vec<TypeInfo>, InvokeErrorKind> {
        method.invoke(report, arguments).map(|()| F::parameter_types())
    }

    #[test]
    fn test_construct() {
        assert_eq!(parameters(&Report::new), [TypeInfo::of::<dyn Clock>(), TypeInfo::of::<String>()]);

        let clock: Arc<dyn Clock> = Arc::new(Fixed(5));
        let report = build(&Report::new, vec![erase(clock), erase(Arc::new("daily".to_owned()))]).unwrap();

        assert_eq!(report.clock.now(), 5);
        assert_eq!(report.title.as_str(), "daily");
    }

    #[test]
    fn test_construct_incorrect_arguments() {
        let err = build(&Report::new, vec![]).err().unwrap();
        assert!(matches!(err, InvokeErrorKind::ArgumentCount { expected: 2, actual: 0 }));

        let err = build(&Report::new, vec![erase(Arc::new(1u8)), erase(Arc::new(String::new()))])
            .err()
            .unwrap();
        assert!(matches!(err, InvokeErrorKind::IncorrectArgument { position: 0, .. }));
    }

    #[test]
    fn test_invoke() {
        let clock: Arc<dyn Clock> = Arc::new(Fixed(9));
        let mut report = Report::new(clock.clone(), Arc::new(String::new()));

        let parameters = call(&Report::stamp, &mut report, vec![erase(clock)]).unwrap();

        assert_eq!(parameters, [TypeInfo::of::<dyn Clock>()]);
        assert_eq!(report.stamped, Some(9));
    }
}
