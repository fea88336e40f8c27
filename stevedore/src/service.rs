//! Type-erased callables stored inside descriptors and backend registrations.

use crate::{
    any::{AnyValue, Instance},
    errors::InvokeErrorKind,
};

pub(crate) trait Service<Request> {
    type Response;
    type Error;

    fn call(&mut self, request: Request) -> Result<Self::Response, Self::Error>;
}

pub(crate) struct BoxCloneService<Request, Response, Error>(
    pub(crate) Box<dyn CloneService<Request, Response = Response, Error = Error> + Send + Sync>,
);

pub(crate) trait CloneService<Request>: Service<Request> {
    #[must_use]
    fn clone_box(&self) -> Box<dyn CloneService<Request, Response = Self::Response, Error = Self::Error> + Send + Sync>;
}

impl<Request, T> CloneService<Request> for T
where
    T: Service<Request> + Clone + Send + Sync + 'static,
{
    #[inline]
    fn clone_box(&self) -> Box<dyn CloneService<Request, Response = T::Response, Error = T::Error> + Send + Sync> {
        Box::new(self.clone())
    }
}

impl<Request, Response, Error> Clone for BoxCloneService<Request, Response, Error> {
    #[inline]
    fn clone(&self) -> Self {
        Self(self.0.clone_box())
    }
}

impl<Request, Response, Error> Service<Request> for BoxCloneService<Request, Response, Error> {
    type Response = Response;
    type Error = Error;

    #[inline]
    fn call(&mut self, request: Request) -> Result<Self::Response, Self::Error> {
        self.0.call(request)
    }
}

impl<Request, Response, Error> BoxCloneService<Request, Response, Error> {
    #[inline]
    pub(crate) fn new<T>(service: T) -> Self
    where
        T: Service<Request, Response = Response, Error = Error> + Clone + Send + Sync + 'static,
    {
        Self(Box::new(service))
    }

    /// Calls a fresh clone, so shared registrations never need `&mut` access.
    #[inline]
    pub(crate) fn invoke(&self, request: Request) -> Result<Response, Error> {
        self.clone().call(request)
    }
}

#[inline]
#[must_use]
pub(crate) const fn service_fn<T>(f: T) -> ServiceFn<T> {
    ServiceFn { f }
}

#[derive(Clone)]
pub(crate) struct ServiceFn<T> {
    f: T,
}

impl<F, Request, Response, Error> Service<Request> for ServiceFn<F>
where
    F: FnMut(Request) -> Result<Response, Error>,
{
    type Response = Response;
    type Error = Error;

    #[inline]
    fn call(&mut self, request: Request) -> Result<Self::Response, Self::Error> {
        (self.f)(request)
    }
}

/// Builds an implementation value from resolved arguments.
pub(crate) type BoxedConstructor = BoxCloneService<Vec<Instance>, AnyValue, InvokeErrorKind>;
/// Calls an injection method on a value and hands the value back.
pub(crate) type BoxedMethod = BoxCloneService<(AnyValue, Vec<Instance>), AnyValue, InvokeErrorKind>;
/// Writes an injection property on a value and hands the value back.
pub(crate) type BoxedSetter = BoxCloneService<(AnyValue, Instance), AnyValue, InvokeErrorKind>;
/// Shares an implementation value as one of the services it provides.
pub(crate) type BoxedCaster = BoxCloneService<AnyValue, Instance, InvokeErrorKind>;
