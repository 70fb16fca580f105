//! Typed bridging of function arguments across the runtime boundary.
//!
//! Registered native functions declare their parameter types in their
//! closure signature; the decode sequence for that signature is captured
//! when the closure is registered, so dispatch needs no runtime type
//! inspection. Outbound JavaScript calls take a tuple of arguments, each
//! encodable as one coded parameter.

use super::messages::{ParamReader, ParamValue, ParamWriter};
use super::{LinkHandle, Outgoing};
use crate::error::Error;

/// A value decodable from one coded parameter.
pub trait FromParameter: Sized {
    fn from_parameter(value: ParamValue) -> Result<Self, Error>;
}

impl FromParameter for bool {
    fn from_parameter(value: ParamValue) -> Result<Self, Error> {
        match value {
            ParamValue::Boolean(value) => Ok(value),
            _ => Err(Error::InvalidArgument("expected a boolean parameter")),
        }
    }
}

impl FromParameter for f64 {
    fn from_parameter(value: ParamValue) -> Result<Self, Error> {
        match value {
            ParamValue::Number(value) => Ok(value),
            _ => Err(Error::InvalidArgument("expected a number parameter")),
        }
    }
}

impl FromParameter for String {
    fn from_parameter(value: ParamValue) -> Result<Self, Error> {
        match value {
            ParamValue::Text(value) => Ok(value),
            _ => Err(Error::InvalidArgument("expected a string parameter")),
        }
    }
}

/// Raw access for callers that want to branch on the decoded type.
impl FromParameter for ParamValue {
    fn from_parameter(value: ParamValue) -> Result<Self, Error> {
        Ok(value)
    }
}

/// A value encodable as one coded parameter.
pub trait IntoParameter {
    fn encode(&self, writer: &mut ParamWriter) -> Result<(), Error>;
}

impl IntoParameter for bool {
    fn encode(&self, writer: &mut ParamWriter) -> Result<(), Error> {
        writer.push_bool(*self);
        Ok(())
    }
}

macro_rules! impl_into_parameter_for_numbers {
    ( $($ty:ty),* ) => {
        $(
            impl IntoParameter for $ty {
                fn encode(&self, writer: &mut ParamWriter) -> Result<(), Error> {
                    writer.push_number(f64::from(*self));
                    Ok(())
                }
            }
        )*
    };
}

impl_into_parameter_for_numbers!(f64, f32, i8, i16, i32, u8, u16, u32);

impl IntoParameter for &str {
    fn encode(&self, writer: &mut ParamWriter) -> Result<(), Error> {
        writer.push_str(self)
    }
}

impl IntoParameter for String {
    fn encode(&self, writer: &mut ParamWriter) -> Result<(), Error> {
        writer.push_str(self)
    }
}

pub(crate) type BoxedCppFunction =
    Box<dyn Fn(&mut ParamReader) -> Result<(), Error> + Send + Sync + 'static>;

/// Closures callable from the browser.
///
/// Implemented for `Fn` closures of up to eight arguments whose types
/// implement [`FromParameter`]. A call with parameters that do not decode to
/// the declared signature is reported as
/// [`InvalidArgument`](Error::InvalidArgument) and dropped.
pub trait CppFunction<Args>: Send + Sync + 'static {
    fn erase(self) -> BoxedCppFunction;
}

macro_rules! impl_cpp_function {
    ( $($ty:ident),* ) => {
        impl<F, $($ty,)*> CppFunction<($($ty,)*)> for F
        where
            F: Fn($($ty),*) + Send + Sync + 'static,
            $($ty: FromParameter,)*
        {
            fn erase(self) -> BoxedCppFunction {
                Box::new(move |_reader| {
                    $(
                        #[allow(non_snake_case)]
                        let $ty = $ty::from_parameter(_reader.next_value()?)?;
                    )*
                    self($($ty),*);
                    Ok(())
                })
            }
        }
    };
}

impl_cpp_function!();
impl_cpp_function!(T1);
impl_cpp_function!(T1, T2);
impl_cpp_function!(T1, T2, T3);
impl_cpp_function!(T1, T2, T3, T4);
impl_cpp_function!(T1, T2, T3, T4, T5);
impl_cpp_function!(T1, T2, T3, T4, T5, T6);
impl_cpp_function!(T1, T2, T3, T4, T5, T6, T7);
impl_cpp_function!(T1, T2, T3, T4, T5, T6, T7, T8);

/// Argument tuples of an outbound JavaScript call.
pub trait CallArgs {
    fn encode(&self, writer: &mut ParamWriter) -> Result<(), Error>;
}

impl CallArgs for () {
    fn encode(&self, _writer: &mut ParamWriter) -> Result<(), Error> {
        Ok(())
    }
}

macro_rules! impl_call_args {
    ( $($ty:ident),+ ) => {
        impl<$($ty: IntoParameter),+> CallArgs for ($($ty,)+) {
            fn encode(&self, writer: &mut ParamWriter) -> Result<(), Error> {
                #[allow(non_snake_case)]
                let ($($ty,)+) = self;
                $( $ty.encode(writer)?; )+
                Ok(())
            }
        }
    };
}

impl_call_args!(T1);
impl_call_args!(T1, T2);
impl_call_args!(T1, T2, T3);
impl_call_args!(T1, T2, T3, T4);
impl_call_args!(T1, T2, T3, T4, T5);
impl_call_args!(T1, T2, T3, T4, T5, T6);
impl_call_args!(T1, T2, T3, T4, T5, T6, T7);
impl_call_args!(T1, T2, T3, T4, T5, T6, T7, T8);

/// Invocable proxy for a JavaScript function on one connected page.
///
/// Calls are fire-and-forget: the wire protocol reserves a return-value
/// envelope but carries no correlation id, so nothing is reported back.
#[derive(Clone)]
pub struct JsFunction {
    name: String,
    link: LinkHandle,
}

impl JsFunction {
    pub(crate) fn new(name: &str, link: LinkHandle) -> Self {
        Self { name: name.to_owned(), link }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invokes the function with `args` — a tuple of [`IntoParameter`]
    /// values, or `()`:
    ///
    /// ```no_run
    /// # fn demo(ui: &webfront::UI) -> Result<(), webfront::Error> {
    /// ui.js_function("addText").call(("Hello World", 2022))?;
    /// ui.js_function("refresh").call(())?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn call(&self, args: impl CallArgs) -> Result<(), Error> {
        let mut writer = ParamWriter::new(self.link.same_endian());
        writer.push_str(&self.name)?;
        args.encode(&mut writer)?;
        let (count, params) = writer.finish();
        self.link.send(Outgoing::FunctionCall { count, params })
    }
}
