//! Turns type descriptors into registration directives.

mod directive;

pub use directive::{ConstructorDirective, Directive, MethodDirective, PropertyDirective, RegistrationPlan, ServiceDirective};

use std::{any::type_name, collections::BTreeSet};

use tracing::warn;

use crate::{
    any::TypeInfo,
    attributes::{
        try_load, try_load_parameter, Attribute, AttributeSet, Dependency, InjectionConstructor, InjectionMethod, MemberInfo,
        ServiceImplementation,
    },
    backend::{ConstructorRef, Implementation, MethodRef, ParameterPlan, PropertyRef, Resolution, ServiceType},
    descriptor::{ConstructorDescriptor, InterfaceDescriptor, ParameterDescriptor, TypeDescriptor},
    errors::PlannerErrorKind,
    lifetime::Lifetime,
};

/// Derives the registration plan the markers of `descriptor` describe.
///
/// # Errors
/// Returns an error when a marker can't be honoured: an interface the type doesn't
/// implement, a marker specified twice, or a generic interface without a readable definition.
pub fn build_plan(descriptor: &TypeDescriptor) -> Result<RegistrationPlan, PlannerErrorKind> {
    Ok(RegistrationPlan {
        implementation: descriptor.info(),
        services: plan_services(descriptor)?,
        constructor: plan_constructor(descriptor)?,
        methods: plan_methods(descriptor)?,
        properties: plan_properties(descriptor)?,
    })
}

/// Plans an explicit mapping of `service` to the type of `descriptor`.
///
/// The service is registered exactly as given; injection members are planned
/// as by [`build_plan`].
///
/// # Errors
/// Returns an error when the type doesn't implement `service` or a marker can't be honoured.
pub fn plan_mapping(
    descriptor: &TypeDescriptor,
    service: &TypeInfo,
    name: Option<&str>,
    lifetime: Lifetime,
) -> Result<RegistrationPlan, PlannerErrorKind> {
    let directive = ServiceDirective {
        service: ServiceType::Exact(*service),
        implementation: implementation_for(descriptor, service)?,
        name: name.filter(|name| !name.is_empty()).map(ToOwned::to_owned),
        lifetime,
    };

    Ok(RegistrationPlan {
        implementation: descriptor.info(),
        services: vec![directive],
        constructor: plan_constructor(descriptor)?,
        methods: plan_methods(descriptor)?,
        properties: plan_properties(descriptor)?,
    })
}

fn implementation_for(descriptor: &TypeDescriptor, interface: &TypeInfo) -> Result<Implementation, PlannerErrorKind> {
    let caster = if *interface == descriptor.info() {
        descriptor.identity()
    } else {
        descriptor.interface(interface).map(InterfaceDescriptor::caster)
    };

    caster
        .map(|caster| Implementation::new(descriptor.info(), *interface, caster.clone()))
        .ok_or(PlannerErrorKind::UnknownInterface {
            implementation: descriptor.info(),
            interface: *interface,
        })
}

fn single<T>(attributes: &AttributeSet, member: &MemberInfo) -> Result<Option<T>, PlannerErrorKind>
where
    T: Attribute + Clone,
{
    if attributes.count_of::<T>() > 1 {
        return Err(PlannerErrorKind::DuplicateAttribute {
            member: member.name.to_owned(),
            attribute: type_name::<T>(),
        });
    }
    Ok(try_load(attributes, member))
}

fn plan_services(descriptor: &TypeDescriptor) -> Result<Vec<ServiceDirective>, PlannerErrorKind> {
    let Some(attribute) = single::<ServiceImplementation>(descriptor.attributes(), &descriptor.member_info())? else {
        return Ok(Vec::new());
    };

    let interfaces = if attribute.interfaces().is_empty() {
        descriptor.interfaces().iter().map(InterfaceDescriptor::info).collect()
    } else {
        attribute.interfaces().to_vec()
    };

    let mut seen = BTreeSet::new();
    interfaces
        .into_iter()
        .filter(|interface| seen.insert(*interface))
        .map(|interface| {
            let implementation = implementation_for(descriptor, &interface)?;
            let service = match interface.generic_definition() {
                Some("") => {
                    return Err(PlannerErrorKind::MalformedGeneric {
                        implementation: descriptor.info(),
                        interface,
                    })
                }
                Some(definition) => ServiceType::OpenGeneric { definition },
                None => ServiceType::Exact(interface),
            };

            Ok(ServiceDirective {
                service,
                implementation,
                name: attribute.name().map(ToOwned::to_owned),
                lifetime: attribute.resolve_lifetime(),
            })
        })
        .collect()
}

fn select_constructor(descriptor: &TypeDescriptor) -> Option<&ConstructorDescriptor> {
    let public = descriptor.constructors().iter().filter(|constructor| constructor.is_public());
    let mut marked = public
        .clone()
        .filter(|constructor| constructor.attributes().is_defined::<InjectionConstructor>());

    match marked.next() {
        Some(constructor) => {
            if marked.next().is_some() {
                warn!(
                    implementation = descriptor.info().name,
                    constructor = constructor.name(),
                    "Several injection constructors are marked, the first one is used"
                );
            }
            Some(constructor)
        }
        None => public.reduce(|selected, constructor| {
            if constructor.arity() > selected.arity() {
                constructor
            } else {
                selected
            }
        }),
    }
}

fn plan_parameters(member: MemberInfo, parameters: &[ParameterDescriptor]) -> Result<ParameterPlan, PlannerErrorKind> {
    parameters
        .iter()
        .map(|parameter| {
            let info = parameter.parameter_info(member);
            if parameter.attributes().count_of::<Dependency>() > 1 {
                return Err(PlannerErrorKind::DuplicateAttribute {
                    member: format!("{}({})", member.name, parameter.name()),
                    attribute: type_name::<Dependency>(),
                });
            }

            let dependency = try_load_parameter::<Dependency>(parameter.attributes(), &info);
            Ok(Resolution::new(parameter.info(), dependency.as_ref().and_then(Dependency::name)))
        })
        .collect()
}

fn plan_constructor(descriptor: &TypeDescriptor) -> Result<Option<ConstructorDirective>, PlannerErrorKind> {
    let Some(constructor) = select_constructor(descriptor) else {
        return Ok(None);
    };

    Ok(Some(ConstructorDirective {
        implementation: descriptor.info(),
        constructor: ConstructorRef::new(
            constructor.name(),
            constructor.invoker().clone(),
            descriptor.identity().cloned(),
        ),
        parameters: plan_parameters(constructor.member_info(), constructor.parameters())?,
    }))
}

fn plan_methods(descriptor: &TypeDescriptor) -> Result<Vec<MethodDirective>, PlannerErrorKind> {
    descriptor
        .methods()
        .iter()
        .filter(|method| method.is_public() && method.arity() > 0 && method.attributes().is_defined::<InjectionMethod>())
        .map(|method| {
            Ok(MethodDirective {
                implementation: descriptor.info(),
                method: MethodRef::new(method.name(), method.invoker().clone()),
                parameters: plan_parameters(method.member_info(), method.parameters())?,
            })
        })
        .collect()
}

fn plan_properties(descriptor: &TypeDescriptor) -> Result<Vec<PropertyDirective>, PlannerErrorKind> {
    let mut directives = Vec::new();

    for property in descriptor.properties() {
        if !property.is_public() || property.is_indexed() {
            continue;
        }
        let Some(setter) = property.setter() else {
            continue;
        };
        let Some(dependency) = single::<Dependency>(property.attributes(), &property.member_info())? else {
            continue;
        };

        directives.push(PropertyDirective {
            implementation: descriptor.info(),
            property: PropertyRef::new(property.name(), property.declared_type(), setter.clone()),
            resolution: Resolution::new(property.declared_type(), dependency.name()),
        });
    }

    Ok(directives)
}
