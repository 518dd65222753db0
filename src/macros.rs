/// Declares a typed model over an entity type.
///
/// ```ignore
/// entity_model! {
///     pub struct User in "users" as document {
///         name: String => { string().required() },
///         age: i64 => { integer().min(0) },
///     }
/// }
/// ```
///
/// Each field names its Rust type and the [`Toolkit`](crate::schema::Toolkit)
/// rule used to validate it. `as edge` builds the model over an edge
/// collection instead.
#[macro_export]
macro_rules! entity_model {
    ($vis:vis struct $name:ident in $collection:literal as document {
        $($field:ident : $field_ty:ty => { $($rule:tt)+ }),+ $(,)?
    }) => {
        $crate::entity_model!(
            @impl $vis $name $collection;
            $crate::entity::DocumentKind;
            $($field : $field_ty => { $($rule)+ }),+
        );
    };
    ($vis:vis struct $name:ident in $collection:literal as edge {
        $($field:ident : $field_ty:ty => { $($rule:tt)+ }),+ $(,)?
    }) => {
        $crate::entity_model!(
            @impl $vis $name $collection;
            $crate::entity::EdgeKind;
            $($field : $field_ty => { $($rule)+ }),+
        );
    };
    (@impl $vis:vis $name:ident $collection:literal; $kind:ty;
        $($field:ident : $field_ty:ty => { $($rule:tt)+ }),+
    ) => {
        $vis struct $name($crate::entity::Entity<$kind>);

        impl $name {
            /// Field names in declaration order.
            pub const FIELDS: &'static [&'static str] = &[$(stringify!($field)),+];

            /// Collection this model is stored in.
            pub const COLLECTION: &'static str = $collection;

            pub fn entity_type(factory: &$crate::entity::EntityFactory) -> $crate::entity::EntityType<$kind> {
                factory.create_entity_type(
                    |toolkit: &$crate::schema::Toolkit, _options: &$crate::config::TypeOptions| {
                        $crate::schema::Schema::new()
                            $(.field(stringify!($field), toolkit.$($rule)+))+
                    },
                    $crate::config::EntityOptions::new().name($collection),
                )
            }

            /// Fresh instance from user data, raising `Merging`.
            pub async fn instantiate(
                entity_type: &$crate::entity::EntityType<$kind>,
                data: $crate::serde_json::Value,
            ) -> $crate::Result<Self> {
                Ok(Self(entity_type.instantiate(data).await?))
            }

            pub fn from_entity(entity: $crate::entity::Entity<$kind>) -> Self {
                Self(entity)
            }

            pub fn into_entity(self) -> $crate::entity::Entity<$kind> {
                self.0
            }

            $(
                pub fn $field(&self) -> $crate::Result<Option<$field_ty>> {
                    self.0.get_as(stringify!($field))
                }
            )+

            $crate::paste::paste! {
                $(
                    pub fn [<set_ $field>](&mut self, value: $field_ty) -> $crate::Result<&mut Self> {
                        let value = $crate::serde_json::to_value(value)?;
                        self.0.set(stringify!($field), value)?;
                        Ok(self)
                    }
                )+
            }
        }

        impl ::std::ops::Deref for $name {
            type Target = $crate::entity::Entity<$kind>;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl ::std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }

        impl ::std::convert::From<$crate::entity::Entity<$kind>> for $name {
            fn from(entity: $crate::entity::Entity<$kind>) -> Self {
                Self(entity)
            }
        }

        impl ::std::convert::From<$name> for $crate::entity::Entity<$kind> {
            fn from(model: $name) -> Self {
                model.0
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.0).finish()
            }
        }
    };
}
