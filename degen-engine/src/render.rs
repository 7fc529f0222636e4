//! The Type Renderer: `render_name` and `to_type_expr`.
//!
//! A line-for-line translation of `examples/original_source/degen/conversions.go`'s
//! `writeType` and `typeToExpr`, which enumerate the separator rules a
//! specialized name and its syntax must agree on. Both functions are total:
//! neither ever fails, each closed-variant case that has no concrete
//! syntax (tuples, bare type parameters, signatures still carrying type
//! parameters) renders to the fixed sentinel instead of erroring.

use degen_ast::sem::{Basic, SemanticType, Var};
use degen_ast::{
    ArrayType, BasicLit, BasicLitKind, ChanDir, ChanTypeExpr, Expr, Field, FieldList,
    FuncTypeExpr, Ident, InterfaceType, MapTypeExpr, NodeId, StructType,
};

fn basic_name(b: Basic) -> &'static str {
    match b {
        Basic::Bool => "bool",
        Basic::Int => "int",
        Basic::Int8 => "int8",
        Basic::Int16 => "int16",
        Basic::Int32 => "int32",
        Basic::Int64 => "int64",
        Basic::Uint => "uint",
        Basic::Uint8 => "uint8",
        Basic::Uint16 => "uint16",
        Basic::Uint32 => "uint32",
        Basic::Uint64 => "uint64",
        Basic::Float32 => "float32",
        Basic::Float64 => "float64",
        Basic::String => "string",
        Basic::Rune => "rune",
        Basic::Byte => "byte",
        Basic::UnsafePointer => "unsafe.Pointer",
    }
}

fn chan_dir_word(dir: ChanDir) -> &'static str {
    match dir {
        ChanDir::Both => "both",
        ChanDir::Send => "send",
        ChanDir::Recv => "recv",
    }
}

/// `render-name(t) -> string`.
pub fn render_name(t: &SemanticType) -> String {
    match t {
        SemanticType::Basic(b) => basic_name(*b).to_string(),
        SemanticType::Named(n) => n.name.clone(),
        SemanticType::Array { len, elem } => format!("array_{len}_{}", render_name(elem)),
        SemanticType::Slice(elem) => format!("slice_{}", render_name(elem)),
        SemanticType::Pointer(elem) => format!("ptr_{}", render_name(elem)),
        SemanticType::Map { key, value } => {
            format!("map_{}_{}", render_name(key), render_name(value))
        }
        SemanticType::Chan { dir, elem } => {
            format!("chan_{}_{}", chan_dir_word(*dir), render_name(elem))
        }
        SemanticType::Struct(fields) => {
            let mut s = String::from("struct_");
            for f in fields {
                s.push_str(&f.name);
                s.push('_');
                s.push_str(&render_name(&f.ty));
                s.push('_');
            }
            s.push_str("end");
            s
        }
        SemanticType::Signature(sig) => {
            if !sig.type_params.is_empty() {
                return "bad".to_string();
            }
            let mut s = String::from("func_");
            for p in &sig.params {
                s.push_str(&render_name(&p.ty));
                s.push('_');
            }
            s.push_str("to_");
            for r in &sig.results {
                s.push_str(&render_name(&r.ty));
                s.push('_');
            }
            s.push_str("end");
            s
        }
        SemanticType::Interface(it) => {
            let mut s = String::from("interface_");
            for m in &it.methods {
                s.push_str(&m.name);
                s.push('_');
                s.push_str(&render_name(&SemanticType::Signature(m.sig.clone())));
                s.push('_');
            }
            s.push_str("end");
            s
        }
        SemanticType::Tuple(_) | SemanticType::TypeParam(_) => "bad".to_string(),
    }
}

fn var_field(v: &Var) -> Field {
    Field {
        names: if v.name.is_empty() {
            vec![]
        } else {
            vec![Ident::new(NodeId(0), v.name.clone())]
        },
        ty: to_type_expr(&v.ty),
        tag: None,
    }
}

fn vars_field_list(vars: &[Var]) -> FieldList {
    FieldList {
        list: vars.iter().map(var_field).collect(),
    }
}

/// `to-type-expr(t) -> AST expression`.
pub fn to_type_expr(t: &SemanticType) -> Expr {
    match t {
        SemanticType::Basic(b) => Expr::Ident(Ident::new(NodeId(0), basic_name(*b))),
        SemanticType::Named(n) => Expr::Ident(Ident::new(NodeId(0), n.name.clone())),
        SemanticType::Array { len, elem } => Expr::ArrayType(ArrayType {
            len: Some(Box::new(Expr::BasicLit(BasicLit {
                kind: BasicLitKind::Int,
                value: len.to_string(),
            }))),
            elt: Box::new(to_type_expr(elem)),
        }),
        SemanticType::Slice(elem) => Expr::ArrayType(ArrayType {
            len: None,
            elt: Box::new(to_type_expr(elem)),
        }),
        SemanticType::Pointer(elem) => Expr::Star(degen_ast::StarExpr {
            x: Box::new(to_type_expr(elem)),
        }),
        SemanticType::Struct(fields) => Expr::StructType(StructType {
            fields: FieldList {
                list: fields
                    .iter()
                    .map(|f| Field {
                        names: vec![Ident::new(NodeId(0), f.name.clone())],
                        ty: to_type_expr(&f.ty),
                        tag: None,
                    })
                    .collect(),
            },
        }),
        SemanticType::Map { key, value } => Expr::MapType(MapTypeExpr {
            key: Box::new(to_type_expr(key)),
            value: Box::new(to_type_expr(value)),
        }),
        SemanticType::Chan { dir, elem } => Expr::ChanType(ChanTypeExpr {
            dir: *dir,
            value: Box::new(to_type_expr(elem)),
        }),
        SemanticType::Signature(sig) => {
            if !sig.type_params.is_empty() {
                return Expr::Bad;
            }
            Expr::FuncType(FuncTypeExpr {
                params: vars_field_list(&sig.params),
                results: vars_field_list(&sig.results),
            })
        }
        SemanticType::Interface(it) => Expr::InterfaceType(InterfaceType {
            methods: FieldList {
                list: it
                    .methods
                    .iter()
                    .map(|m| Field {
                        names: vec![Ident::new(NodeId(0), m.name.clone())],
                        ty: to_type_expr(&SemanticType::Signature(m.sig.clone())),
                        tag: None,
                    })
                    .collect(),
            },
        }),
        SemanticType::Tuple(_) | SemanticType::TypeParam(_) => Expr::Bad,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use degen_ast::sem::{Named, Signature};

    #[test]
    fn renders_struct_with_separators_matching_contract() {
        let t = SemanticType::Struct(vec![
            degen_ast::sem::StructField {
                name: "First".into(),
                ty: SemanticType::Basic(Basic::Float64),
                embedded: false,
            },
            degen_ast::sem::StructField {
                name: "Rest".into(),
                ty: SemanticType::Pointer(Box::new(SemanticType::Named(Named {
                    name: "List_float64".into(),
                    type_args: vec![],
                    underlying: Box::new(SemanticType::Tuple(vec![])),
                }))),
                embedded: false,
            },
        ]);
        assert_eq!(
            render_name(&t),
            "struct_First_float64_Rest_ptr_List_float64_end"
        );
    }

    #[test]
    fn signature_with_type_params_renders_bad() {
        let sig = Signature {
            type_params: vec![degen_ast::sem::TypeParamIdGen::next()],
            params: vec![],
            results: vec![],
            variadic: false,
        };
        assert_eq!(render_name(&SemanticType::Signature(sig.clone())), "bad");
        assert_eq!(to_type_expr(&SemanticType::Signature(sig)), Expr::Bad);
    }

    #[test]
    fn named_renders_to_bare_identifier() {
        let n = SemanticType::Named(Named {
            name: "Heap_int".into(),
            type_args: vec![],
            underlying: Box::new(SemanticType::Tuple(vec![])),
        });
        assert_eq!(render_name(&n), "Heap_int");
        assert_eq!(
            to_type_expr(&n),
            Expr::Ident(Ident::new(NodeId(0), "Heap_int"))
        );
    }
}
