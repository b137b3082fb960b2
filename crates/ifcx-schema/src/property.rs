//! Property sets and single-value properties.

use ifcx_step::{Decl, SchemaBuilder};

use crate::text;

pub(crate) fn declare(b: &mut SchemaBuilder) {
    b.entity("IfcPropertyDefinition")
        .subtype_of("IfcRoot")
        .abstract_entity();
    b.entity("IfcPropertySetDefinition")
        .subtype_of("IfcPropertyDefinition")
        .abstract_entity()
        .inverse(
            "DefinesOccurrence",
            "IfcRelDefinesByProperties",
            "RelatingPropertyDefinition",
        );
    b.entity("IfcPropertySet")
        .subtype_of("IfcPropertySetDefinition")
        .attribute("HasProperties", Decl::list(Decl::named("IfcProperty")));

    b.entity("IfcPropertyAbstraction").abstract_entity();
    b.entity("IfcProperty")
        .subtype_of("IfcPropertyAbstraction")
        .abstract_entity()
        .attribute("Name", Decl::named("IfcIdentifier"))
        .optional("Description", text())
        .inverse("PartOfPset", "IfcPropertySet", "HasProperties");
    b.entity("IfcSimpleProperty")
        .subtype_of("IfcProperty")
        .abstract_entity();
    b.entity("IfcPropertySingleValue")
        .subtype_of("IfcSimpleProperty")
        .optional("NominalValue", Decl::named("IfcValue"))
        .optional("Unit", Decl::named("IfcUnit"));
    b.entity("IfcPropertyListValue")
        .subtype_of("IfcSimpleProperty")
        .optional("ListValues", Decl::list(Decl::named("IfcValue")))
        .optional("Unit", Decl::named("IfcUnit"));
}
