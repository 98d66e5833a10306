use darling::{ast, FromMeta};
use proc_macro::TokenStream;
use quote::{format_ident, quote};

#[derive(FromMeta)]
struct RouteArgs {
	#[darling(multiple)]
	tag: Vec<syn::Expr>,
	#[darling(multiple)]
	response: Vec<ResponseArgs>,
}

#[derive(FromMeta)]
struct ResponseArgs {
	status: syn::LitInt,
	shape: Option<syn::Type>,
	description: Option<String>,
}

pub fn from_input(args: TokenStream, input: TokenStream) -> TokenStream {
	let args = match ast::NestedMeta::parse_meta_list(args.into()) {
		Ok(x) => x,
		Err(e) => return e.into_compile_error().into(),
	};

	let args = match RouteArgs::from_list(&args) {
		Ok(x) => x,
		Err(e) => return e.write_errors().into(),
	};

	let function = syn::parse_macro_input!(input as syn::ItemFn);
	let (summary, description) = split_doc_comment(&function.attrs);

	let fn_name = format_ident!("{}_docs", function.sig.ident);
	let fn_vis = &function.vis;

	let tags = args.tag.iter();
	let responses = args.response.into_iter().map(|response| {
		let status = response.status;
		let shape = response.shape.map_or_else(|| quote!(()), |x| quote!(#x));

		if let Some(description) = response.description {
			quote! {
				.response_with::<#status, #shape, _>(|res| res.description(#description))
			}
		} else {
			quote! {
				.response::<#status, #shape>()
			}
		}
	});

	quote! {
		#function

		#fn_vis fn #fn_name(op: aide::transform::TransformOperation) -> aide::transform::TransformOperation {
			op.description(#description).summary(#summary)
				#(
					.tag(#tags)
				)*
				#(
					#responses
				)*
		}
	}
	.into()
}

/// Splits the function's doc comment into the operation summary (the first
/// line) and its description (everything after).
fn split_doc_comment(attrs: &[syn::Attribute]) -> (String, String) {
	let mut lines = String::new();

	for attr in attrs {
		let syn::Meta::NameValue(ref doc) = attr.meta else {
			continue;
		};

		if doc.path != format_ident!("doc").into() {
			continue;
		}

		if let syn::Expr::Lit(syn::ExprLit {
			lit: syn::Lit::Str(ref literal),
			..
		}) = doc.value
		{
			// Trim lines like rustdoc does
			lines += literal.value().trim();
			lines += "\n";
		}
	}

	let lines = lines.trim().replace("\\\n", "");
	let mut paragraphs = lines.splitn(2, '\n').filter(|x| !x.is_empty());

	let summary = paragraphs
		.next()
		.map(|x| x.replace('\n', " "))
		.expect("missing summary");
	let description = paragraphs
		.next()
		.map(ToOwned::to_owned)
		.expect("missing description");

	(summary, description)
}
