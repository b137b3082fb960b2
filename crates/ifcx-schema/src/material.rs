//! Materials and their association to objects.

use ifcx_step::{Decl, SchemaBuilder};

use crate::{label, text};

pub(crate) fn declare(b: &mut SchemaBuilder) {
    b.entity("IfcMaterialDefinition")
        .abstract_entity()
        .inverse("AssociatedTo", "IfcRelAssociatesMaterial", "RelatingMaterial");
    b.entity("IfcMaterial")
        .subtype_of("IfcMaterialDefinition")
        .attribute("Name", label())
        .optional("Description", text())
        .optional("Category", label());
    b.entity("IfcMaterialList")
        .attribute("Materials", Decl::list(Decl::named("IfcMaterial")));
    b.entity("IfcRelAssociatesMaterial")
        .subtype_of("IfcRelAssociates")
        .attribute("RelatingMaterial", Decl::named("IfcMaterialSelect"));
}
