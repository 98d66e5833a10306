mod route;

use proc_macro::TokenStream;

/// Creates a new documentation function for the route, named after the
/// original function with the suffix `_docs`. The first line of the doc
/// comment becomes the operation summary, the rest its description.
#[proc_macro_attribute]
pub fn route(args: TokenStream, input: TokenStream) -> TokenStream {
	route::from_input(args, input)
}
