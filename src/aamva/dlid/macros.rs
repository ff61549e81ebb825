macro_rules! data_elements {
	(
		$(#[$enum_meta:meta])*
		$vis:vis enum $enum_id:ident {
			$(
				$(#[$meta:meta])*
				$id:ident : $tag:literal => {
					name: $name:literal,
					label: $label:literal,
					presence: $presence:ident,
					format: $format:expr,
					transform: $transform:expr,
					empty: $empty:expr $(,)?
				}
			),* $(,)?
		}
	) => {
		$(#[$enum_meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
		$vis enum $enum_id {
			$($(#[$meta])* $id),*
		}

		impl $enum_id {
			pub const COUNT: usize = $crate::aamva::dlid::data_elements!(@count $($id,)*);

			/// Every element, in canonical stream order.
			pub const LIST: [Self; Self::COUNT] = [$(Self::$id),*];

			pub fn from_id(id: &[u8; 3]) -> Option<Self> {
				match id {
					$($tag => Some(Self::$id),)*
					_ => None
				}
			}

			pub fn from_name(name: &str) -> Option<Self> {
				match name {
					$($name => Some(Self::$id),)*
					_ => None
				}
			}

			pub fn id(&self) -> &'static [u8; 3] {
				match self {
					$(Self::$id => $tag),*
				}
			}

			pub fn name(&self) -> &'static str {
				match self {
					$(Self::$id => $name),*
				}
			}

			pub fn info(&self) -> $crate::aamva::dlid::ElementInfo {
				use $crate::aamva::dlid::{types::*, EmptyPolicy, Presence};

				match self {
					$(Self::$id => $crate::aamva::dlid::ElementInfo {
						element: Self::$id,
						label: $label,
						presence: Presence::$presence,
						format: $format,
						transform: $transform,
						empty: $empty,
					}),*
				}
			}
		}

		impl $enum_id {
			pub fn string_id(&self) -> &'static str {
				std::str::from_utf8(self.id()).unwrap_or_default()
			}
		}
	};
	(@count $a:ident, $($rest:ident,)*) => {
		1usize + $crate::aamva::dlid::data_elements!(@count $($rest,)*)
	};
	(@count) => {
		0usize
	}
}

pub(crate) use data_elements;
